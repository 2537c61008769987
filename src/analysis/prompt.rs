use crate::analysis::AnalysisError;
use crate::encode::EncodedPayload;
use serde_json::{json, Value};

/// Fixed instruction template sent with every run. The rule-set is the domain
/// policy: extraction list, the three allowance-vs-actual arbitrations, the
/// non-redundancy rule, and the checklist of named mechanisms. Changing this
/// text changes advisory behavior, so treat edits as a versioned rules change.
const RULES_HEADER: &str = "\
Agis en tant qu'expert en fiscalité française et Conseiller en Gestion de Patrimoine (CGP) senior.
Analyse les documents d'imposition fournis (avis d'imposition, déclaration de revenus).";

const RULES_BODY: &str = "\
1. Extrais les données clés (TMI, Revenus, Charges, Crédits).
2. Calcule la TMI précise.
3. Effectue un audit exhaustif des opportunités d'optimisation.

RÈGLE DE PRIORITÉ SUR LES RÉGIMES :
Même si le client a \"déjà implémenté\" une stratégie de déclaration (ex: il a déclaré en Micro-Foncier), si cette stratégie repose sur un ABATTEMENT FORFAITAIRE, tu DOIS analyser si le passage au RÉEL (ou amortissement) serait plus bénéfique.

Analyses spécifiques d'arbitrage (Abattement vs Réel) :
- IMMOBILIER FONCIER : Si déclaré en Micro-Foncier (case 4BE - 30% abattement), compare avec le Réel (déduction intérêts, travaux, charges). Si le gain est probable, suggère le passage au Réel.
- MEUBLÉ (LMNP) : Si déclaré en Micro-BIC (case 5ND/5OD - 50% abattement), calcule l'intérêt du passage au LMNP au RÉEL pour pratiquer l'amortissement comptable (souvent bien supérieur à 50% de charges).
- SALAIRES : Si abattement de 10% appliqué par défaut, vérifie si le profil (gros revenus, éloignement géographique probable) justifierait les Frais Réels (kilomètres, repas).

RÈGLE CRITIQUE DE NON-REDUNDANCE :
Ne propose pas de \"Verser sur un PER\" si le plafond est déjà atteint.
Ne propose pas de \"Faire des dons\" si le client en fait déjà massivement par rapport à son impôt.
Bref, ne propose pas ce qui est déjà optimisé au maximum.

Niches fiscales et leviers à scanner :
- Famille : Frais de garde (7GA), Scolarité (7EA), Emploi domicile (7DB).
- Investissement : Girardin (G3), IR-PME/FIP/FCPI, SOFICA.
- Retraite : PER (vérifier reliquat plafonds 6PS/6PT/6PU).
- Arbitrage financier : PFU vs Barème (case 2OP).

Retourne les données UNIQUEMENT au format JSON.";

/// Builds the instruction text. Non-empty advisor context is embedded between
/// the header and the rules and flagged to outweigh the generic heuristics.
pub fn build_prompt(user_context: &str) -> String {
    let context = user_context.trim();
    if context.is_empty() {
        format!("{RULES_HEADER}\n\n{RULES_BODY}")
    } else {
        format!(
            "{RULES_HEADER}\n\nCONTEXTE CLIENT SPÉCIFIQUE (À PRENDRE EN COMPTE PRIORITAIREMENT) : \"{context}\"\n\n{RULES_BODY}"
        )
    }
}

/// Structural schema constraining the model's JSON output, mirroring the
/// types in `model`. Field names must match the serde renames there exactly;
/// the parser does no renaming or fuzzy matching.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "extractedData": {
                "type": "OBJECT",
                "properties": {
                    "fullName": { "type": "STRING" },
                    "year": { "type": "NUMBER" },
                    "householdParts": { "type": "NUMBER" },
                    "taxableIncome": { "type": "NUMBER" },
                    "tmi": { "type": "NUMBER" },
                    "totalTaxPaid": { "type": "NUMBER" },
                    "perCeilingAvailable": { "type": "NUMBER" },
                    "realEstateIncome": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "amount": { "type": "NUMBER" },
                                "regime": { "type": "STRING" },
                                "type": { "type": "STRING" }
                            }
                        }
                    },
                    "financialIncome": {
                        "type": "OBJECT",
                        "properties": {
                            "dividends": { "type": "NUMBER" },
                            "capitalGains": { "type": "NUMBER" },
                            "regime": { "type": "STRING" }
                        }
                    }
                },
                "required": ["fullName", "taxableIncome", "tmi"]
            },
            "optimizations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "estimatedGain": { "type": "STRING" },
                        "complexity": { "type": "STRING" },
                        "actionable": { "type": "STRING" }
                    }
                }
            },
            "summary": { "type": "STRING" }
        },
        "required": ["extractedData", "optimizations", "summary"]
    })
}

/// One analysis call: ordered document payloads plus the instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    payloads: Vec<EncodedPayload>,
    prompt: String,
}

impl AnalysisRequest {
    /// A request without documents must never reach the wire; the workflow
    /// guards this earlier, the builder enforces it.
    pub fn new(payloads: Vec<EncodedPayload>, user_context: &str) -> Result<Self, AnalysisError> {
        if payloads.is_empty() {
            return Err(AnalysisError::EmptyRequest);
        }
        Ok(Self {
            payloads,
            prompt: build_prompt(user_context),
        })
    }

    pub fn payloads(&self) -> &[EncodedPayload] {
        &self.payloads
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
