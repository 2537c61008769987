use crate::model::AnalysisResult;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File-name-safe slug from the client's full name, capped at 32 chars.
fn slugify(raw: &str) -> String {
    let mut out = String::new();
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if (ch == ' ' || ch == '-' || ch == '_') && !out.ends_with('-') {
            out.push('-');
        }
        if out.len() >= 32 {
            break;
        }
    }
    let out = out.trim_matches('-').to_string();
    if out.is_empty() {
        "client".to_string()
    } else {
        out
    }
}

fn file_stem(result: &AnalysisResult) -> String {
    let slug = slugify(&result.extracted_data.full_name);
    match result.extracted_data.year {
        Some(year) => format!("audit-fiscal-{slug}-{year}"),
        None => format!("audit-fiscal-{slug}"),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if path.exists() {
                fs::remove_file(path)?;
                fs::rename(&tmp_path, path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

/// Writes the result as pretty JSON next to the working directory and returns
/// the path. The export is the raw wire shape, usable as input elsewhere.
pub fn export_json(result: &AnalysisResult, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(format!("{}.json", file_stem(result)));
    let bytes = serde_json::to_vec_pretty(result)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    write_atomic(&path, &bytes)?;
    Ok(path)
}

/// Writes the print-formatted advisor report and returns the path.
pub fn export_report(result: &AnalysisResult, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(format!("{}.txt", file_stem(result)));
    write_atomic(&path, print_report(result).as_bytes())?;
    Ok(path)
}

fn euros(amount: f64) -> String {
    format!("{amount:.0} €")
}

/// Plain-text report for handing to the client. Absent optional fields are
/// skipped, never rendered as zero.
pub fn print_report(result: &AnalysisResult) -> String {
    let data = &result.extracted_data;
    let mut out = String::new();

    let _ = writeln!(out, "AUDIT FISCAL — {}", data.full_name);
    if let Some(year) = data.year {
        let _ = writeln!(out, "Situation fiscale {year}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Revenu imposable : {}", euros(data.taxable_income));
    let _ = writeln!(out, "TMI : {:.0} %", data.tmi);
    if let Some(parts) = data.household_parts {
        let _ = writeln!(out, "Parts fiscales : {parts}");
    }
    if let Some(tax) = data.total_tax_paid {
        let _ = writeln!(out, "Impôt sur le revenu : {}", euros(tax));
    }
    if let Some(ceiling) = data.per_ceiling_available {
        let _ = writeln!(out, "Plafond PER disponible : {}", euros(ceiling));
    }

    if !data.real_estate_income.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "REVENUS IMMOBILIERS");
        for income in &data.real_estate_income {
            let _ = writeln!(
                out,
                "- {} ({:?}, régime {:?})",
                euros(income.amount),
                income.kind,
                income.regime
            );
        }
    }

    if let Some(financial) = &data.financial_income {
        let _ = writeln!(out);
        let _ = writeln!(out, "REVENUS FINANCIERS");
        if let Some(dividends) = financial.dividends {
            let _ = writeln!(out, "- Dividendes : {}", euros(dividends));
        }
        if let Some(gains) = financial.capital_gains {
            let _ = writeln!(out, "- Plus-values : {}", euros(gains));
        }
        if let Some(regime) = financial.regime {
            let _ = writeln!(out, "- Régime : {regime:?}");
        }
    }

    if !result.summary.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "SYNTHÈSE DE L'EXPERT");
        let _ = writeln!(out, "{}", result.summary);
    }

    if !result.optimizations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "STRATÉGIES D'OPTIMISATION PRÉCONISÉES");
        for (index, opt) in result.optimizations.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}. {} [{}]", index + 1, opt.title, opt.category.label());
            let _ = writeln!(out, "   {}", opt.description);
            let _ = writeln!(out, "   Gain estimé : {}", opt.estimated_gain);
            let _ = writeln!(out, "   Complexité : {}", opt.complexity.label());
            let _ = writeln!(out, "   Prochaine étape : {}", opt.actionable);
        }
    }

    out
}
