use crate::types::Year;
use thiserror::Error;

/// Per-file ingestion failure. None of these abort a batch; the session
/// collects them as warnings and keeps whatever parsed successfully.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("Error reading '{file}': a required sheet is missing. Missing sheet: '{sheet}'")]
    MissingSheet { file: String, sheet: String },

    #[error(
        "Could not determine year for file '{file}'. Please include the year ({}) in the filename.",
        join_years(.years)
    )]
    AmbiguousYear { file: String, years: Vec<Year> },

    #[error("An unexpected error occurred while reading '{file}': {message}")]
    UnexpectedFormat { file: String, message: String },
}

impl IngestError {
    pub fn file(&self) -> &str {
        match self {
            IngestError::MissingSheet { file, .. }
            | IngestError::AmbiguousYear { file, .. }
            | IngestError::UnexpectedFormat { file, .. } => file,
        }
    }
}

/// Raised while building a year's panel. Fatal for that panel only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Summary for {year} has no metric '{metric}'")]
    MissingMetric { year: Year, metric: String },
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to build template workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

fn join_years(years: &[Year]) -> String {
    let parts: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        n => format!("{}, or {}", parts[..n - 1].join(", "), parts[n - 1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sheet_message_names_sheet() {
        let e = IngestError::MissingSheet {
            file: "results_2030.xlsx".into(),
            sheet: "Refinery_Utilization".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("results_2030.xlsx"));
        assert!(msg.contains("Refinery_Utilization"));
    }

    #[test]
    fn ambiguous_year_lists_valid_years() {
        let e = IngestError::AmbiguousYear {
            file: "plan.xlsx".into(),
            years: Year::ALL.to_vec(),
        };
        assert_eq!(
            e.to_string(),
            "Could not determine year for file 'plan.xlsx'. Please include the year (2030, 2040, or 2050) in the filename."
        );
        assert_eq!(e.file(), "plan.xlsx");
    }
}
