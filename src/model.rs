use serde::{Deserialize, Serialize};

/// Key figures extracted from the client's tax notice.
///
/// Field names are the wire contract with the model: serde renames must match
/// the response schema character-for-character, no fuzzy matching happens on
/// either side. `fullName`, `taxableIncome` and `tmi` are the required subset;
/// everything else renders as absent when the documents did not carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxData {
    pub full_name: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// Quotient familial units, e.g. 2.5 for a couple with one child.
    #[serde(default)]
    pub household_parts: Option<f64>,
    pub taxable_income: f64,
    /// Tranche marginale d'imposition, one of 0, 11, 30, 41, 45.
    pub tmi: f64,
    #[serde(default)]
    pub total_tax_paid: Option<f64>,
    #[serde(default)]
    pub per_ceiling_available: Option<f64>,
    #[serde(default)]
    pub real_estate_income: Vec<RealEstateIncome>,
    #[serde(default)]
    pub financial_income: Option<FinancialIncome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateIncome {
    pub amount: f64,
    pub regime: RentalRegime,
    #[serde(rename = "type")]
    pub kind: RentalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentalRegime {
    Micro,
    Reel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RentalType {
    Foncier,
    #[serde(rename = "LMNP")]
    Lmnp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialIncome {
    #[serde(default)]
    pub dividends: Option<f64>,
    #[serde(default)]
    pub capital_gains: Option<f64>,
    #[serde(default)]
    pub regime: Option<FinancialRegime>,
}

/// Flat withholding (PFU) vs progressive scale election on investment income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialRegime {
    #[serde(rename = "PFU")]
    Pfu,
    Scale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSuggestion {
    pub category: OptimizationCategory,
    pub title: String,
    pub description: String,
    /// Display string, not guaranteed numeric: may be a range or "variable".
    pub estimated_gain: String,
    pub complexity: Complexity,
    pub actionable: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationCategory {
    Retirement,
    Investment,
    RealEstate,
    TaxRegime,
    Family,
}

impl OptimizationCategory {
    pub fn label(self) -> &'static str {
        match self {
            OptimizationCategory::Retirement => "Retraite",
            OptimizationCategory::Investment => "Investissement",
            OptimizationCategory::RealEstate => "Immobilier",
            OptimizationCategory::TaxRegime => "Régime fiscal",
            OptimizationCategory::Family => "Famille",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn label(self) -> &'static str {
        match self {
            Complexity::Low => "Faible",
            Complexity::Medium => "Moyenne",
            Complexity::High => "Élevée",
        }
    }
}

/// The sole artifact handed to the dashboard. Replaced wholesale on a new
/// run, cleared on reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub extracted_data: TaxData,
    #[serde(default)]
    pub optimizations: Vec<OptimizationSuggestion>,
    #[serde(default)]
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_data_deserializes_wire_field_names() {
        let data: TaxData = serde_json::from_str(
            r#"{
                "fullName": "Jean Dupont",
                "year": 2023,
                "householdParts": 2,
                "taxableIncome": 45000,
                "tmi": 30,
                "totalTaxPaid": 6000,
                "perCeilingAvailable": 3000,
                "realEstateIncome": [
                    {"amount": 12000, "regime": "Micro", "type": "Foncier"},
                    {"amount": 8000, "regime": "Reel", "type": "LMNP"}
                ],
                "financialIncome": {"dividends": 1500, "capitalGains": 0, "regime": "PFU"}
            }"#,
        )
        .expect("full payload should deserialize");

        assert_eq!(data.full_name, "Jean Dupont");
        assert_eq!(data.tmi, 30.0);
        assert_eq!(data.real_estate_income.len(), 2);
        assert_eq!(data.real_estate_income[0].regime, RentalRegime::Micro);
        assert_eq!(data.real_estate_income[1].kind, RentalType::Lmnp);
        assert_eq!(
            data.financial_income.and_then(|f| f.regime),
            Some(FinancialRegime::Pfu)
        );
    }

    #[test]
    fn tax_data_requires_tmi() {
        let err = serde_json::from_str::<TaxData>(
            r#"{"fullName": "Jean Dupont", "taxableIncome": 45000}"#,
        )
        .expect_err("missing tmi should fail");
        assert!(err.to_string().contains("tmi"));
    }

    #[test]
    fn tax_data_tolerates_absent_optional_fields() {
        let data: TaxData = serde_json::from_str(
            r#"{"fullName": "Marie Martin", "taxableIncome": 30000, "tmi": 11}"#,
        )
        .expect("required-only payload should deserialize");

        assert_eq!(data.year, None);
        assert!(data.real_estate_income.is_empty());
        assert!(data.financial_income.is_none());
    }

    #[test]
    fn enum_serialization_matches_wire_strings() {
        assert_eq!(
            serde_json::to_value(RentalType::Lmnp).unwrap(),
            serde_json::json!("LMNP")
        );
        assert_eq!(
            serde_json::to_value(FinancialRegime::Pfu).unwrap(),
            serde_json::json!("PFU")
        );
        assert_eq!(
            serde_json::to_value(OptimizationCategory::TaxRegime).unwrap(),
            serde_json::json!("TaxRegime")
        );
    }

    #[test]
    fn analysis_result_round_trips_required_fields() {
        let source = r#"{
            "extractedData": {"fullName": "Jean Dupont", "taxableIncome": 45000, "tmi": 30},
            "optimizations": [],
            "summary": "ok"
        }"#;
        let result: AnalysisResult = serde_json::from_str(source).unwrap();
        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["extractedData"]["fullName"], "Jean Dupont");
        assert_eq!(back["extractedData"]["taxableIncome"], 45000.0);
        assert_eq!(back["extractedData"]["tmi"], 30.0);
    }
}
