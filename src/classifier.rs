//! Row Classifier
//!
//! Decides whether an input row is sales data, a subtotal/grand-total line,
//! or a structurally broken row.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SalesError;

/// Minimum number of fields a data row must carry (quantity lives at index 6).
pub const MIN_FIELDS: usize = 7;

pub const SHOP_FIELD: usize = 0;
pub const CODE_FIELD: usize = 3;
pub const NAME_FIELD: usize = 4;
pub const QUANTITY_FIELD: usize = 6;

/// Markers that identify subtotal and grand-total rows in the shop column.
const SUMMARY_MARKERS: [&str; 3] = ["Total", "Branch Total", "Grand Total"];
const SUMMARY_SUFFIXES: [&str; 2] = ["Branch Total Sale Value", "Total Branch Sale"];

/// Row classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowClass {
    Accept,
    SkipSummary,
    SkipMalformed,
}

impl fmt::Display for RowClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowClass::Accept => write!(f, "Accept"),
            RowClass::SkipSummary => write!(f, "SkipSummary"),
            RowClass::SkipMalformed => write!(f, "SkipMalformed"),
        }
    }
}

/// How summary markers are matched against the shop column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryMatch {
    /// Markers must appear with their exact capitalization.
    #[default]
    CaseSensitive,
    /// Markers are matched against the lowercased shop column.
    CaseInsensitive,
}

impl FromStr for SummaryMatch {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sensitive" | "case-sensitive" => Ok(SummaryMatch::CaseSensitive),
            "insensitive" | "case-insensitive" => Ok(SummaryMatch::CaseInsensitive),
            other => Err(SalesError::Config(format!(
                "unknown summary match mode '{}' (expected 'sensitive' or 'insensitive')",
                other
            ))),
        }
    }
}

/// Row classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RowClassifier {
    summary_match: SummaryMatch,
}

impl RowClassifier {
    pub fn new(summary_match: SummaryMatch) -> Self {
        Self { summary_match }
    }

    pub fn summary_match(&self) -> SummaryMatch {
        self.summary_match
    }

    /// Classify a row.
    ///
    /// Structural checks (empty row, too few fields, blank shop) run first,
    /// then the summary test, then the blank product code test. A grand total
    /// line with no product code therefore reports as `SkipSummary`.
    pub fn classify<S: AsRef<str>>(&self, record: &[S]) -> RowClass {
        if record.len() < MIN_FIELDS {
            return RowClass::SkipMalformed;
        }

        let shop = record[SHOP_FIELD].as_ref().trim();
        if shop.is_empty() {
            return RowClass::SkipMalformed;
        }

        if self.is_summary_shop(shop) {
            return RowClass::SkipSummary;
        }

        if record[CODE_FIELD].as_ref().trim().is_empty() {
            return RowClass::SkipMalformed;
        }

        RowClass::Accept
    }

    /// Whether an already trimmed shop value marks a summary line.
    pub fn is_summary_shop(&self, shop: &str) -> bool {
        if shop.is_empty() {
            return true;
        }

        match self.summary_match {
            SummaryMatch::CaseSensitive => matches_summary(shop, |m| m.to_string()),
            SummaryMatch::CaseInsensitive => {
                matches_summary(&shop.to_lowercase(), |m| m.to_lowercase())
            }
        }
    }
}

fn matches_summary(shop: &str, fold: impl Fn(&str) -> String) -> bool {
    SUMMARY_MARKERS.iter().any(|m| shop.contains(fold(m).as_str()))
        || SUMMARY_SUFFIXES.iter().any(|s| shop.ends_with(fold(s).as_str()))
}

/// Classify a row with the default (case-sensitive) summary policy.
pub fn classify<S: AsRef<str>>(record: &[S]) -> RowClass {
    RowClassifier::default().classify(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(shop: &str, code: &str) -> Vec<String> {
        vec![
            shop.to_string(),
            "x".to_string(),
            "y".to_string(),
            code.to_string(),
            "Widget".to_string(),
            "z".to_string(),
            "10".to_string(),
        ]
    }

    #[test]
    fn test_accepts_data_row() {
        assert_eq!(classify(&row("Bahria Town", "P1")), RowClass::Accept);
    }

    #[test]
    fn test_grand_total_row_is_summary() {
        let record = ["Grand Total", "", "", "", "", "", "500"];
        assert_eq!(classify(&record), RowClass::SkipSummary);
    }

    #[test]
    fn test_summary_suffixes() {
        assert_eq!(
            classify(&row("Iqbal Town Branch Total Sale Value", "P1")),
            RowClass::SkipSummary
        );
        assert_eq!(classify(&row("Awaisia Total Branch Sale", "")), RowClass::SkipSummary);
    }

    #[test]
    fn test_malformed_rows() {
        let empty: [&str; 0] = [];
        assert_eq!(classify(&empty), RowClass::SkipMalformed);
        assert_eq!(classify(&["Bahria Town", "x", "y", "P1"]), RowClass::SkipMalformed);
        assert_eq!(classify(&row("   ", "P1")), RowClass::SkipMalformed);
        assert_eq!(classify(&row("Bahria Town", "  ")), RowClass::SkipMalformed);
    }

    #[test]
    fn test_case_sensitive_policy_keeps_lowercase_total() {
        let classifier = RowClassifier::new(SummaryMatch::CaseSensitive);
        assert_eq!(classifier.classify(&row("grand total", "P1")), RowClass::Accept);
        assert_eq!(classifier.classify(&row("TOTAL", "P1")), RowClass::Accept);
    }

    #[test]
    fn test_case_insensitive_policy_drops_any_total() {
        let classifier = RowClassifier::new(SummaryMatch::CaseInsensitive);
        assert_eq!(classifier.classify(&row("grand total", "P1")), RowClass::SkipSummary);
        assert_eq!(classifier.classify(&row("TOTAL", "P1")), RowClass::SkipSummary);
        assert_eq!(
            classifier.classify(&row("johar town branch total sale value", "P1")),
            RowClass::SkipSummary
        );
        assert_eq!(classifier.classify(&row("Bahria Town", "P1")), RowClass::Accept);
    }

    #[test]
    fn test_summary_match_from_str() {
        assert_eq!("sensitive".parse::<SummaryMatch>().unwrap(), SummaryMatch::CaseSensitive);
        assert_eq!(
            " Case-Insensitive ".parse::<SummaryMatch>().unwrap(),
            SummaryMatch::CaseInsensitive
        );
        assert!("sometimes".parse::<SummaryMatch>().is_err());
    }
}
