//! Run configuration
//!
//! Values come from command-line flags, then the environment (a `.env` file
//! is honoured), then built-in defaults.

use std::env;

use crate::aggregation::AllowList;
use crate::classifier::SummaryMatch;
use crate::error::{Result, SalesError};
use crate::report::CsvLayout;

pub const BRANCHES_VAR: &str = "SALES_BRANCHES";
pub const SUMMARY_MATCH_VAR: &str = "SALES_SUMMARY_MATCH";
pub const CSV_LAYOUT_VAR: &str = "SALES_CSV_LAYOUT";

/// Branches processed when nothing else is configured.
pub const DEFAULT_BRANCHES: [&str; 4] = [
    "AWAISIA",
    "BAHRIA TOWN",
    "IQBAL TOWN",
    "JOHAR TOWN PHARMACY",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub branches: AllowList,
    pub summary_match: SummaryMatch,
    pub layout: CsvLayout,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            branches: AllowList::new(DEFAULT_BRANCHES),
            summary_match: SummaryMatch::default(),
            layout: CsvLayout::default(),
        }
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub branches: Option<String>,
    pub summary_match: Option<String>,
    pub layout: Option<String>,
}

impl AnalyzerConfig {
    /// Build the configuration from CLI overrides layered over the
    /// process environment.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self> {
        dotenv::dotenv().ok();
        Self::resolve(overrides, |key| env::var(key).ok())
    }

    /// Layer `overrides` over values from `lookup` over defaults.
    pub fn resolve<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(branches) = overrides.branches.or_else(|| lookup(BRANCHES_VAR)) {
            config.branches = AllowList::parse(&branches);
        }
        if let Some(mode) = overrides.summary_match.or_else(|| lookup(SUMMARY_MATCH_VAR)) {
            config.summary_match = mode.parse()?;
        }
        if let Some(layout) = overrides.layout.or_else(|| lookup(CSV_LAYOUT_VAR)) {
            config.layout = layout.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(SalesError::Config(
                "at least one branch name is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::resolve(ConfigOverrides::default(), lookup(&[])).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.branches.len(), 4);
        assert!(config.branches.allows("Johar Town Pharmacy"));
    }

    #[test]
    fn test_environment_values() {
        let config = AnalyzerConfig::resolve(
            ConfigOverrides::default(),
            lookup(&[
                (BRANCHES_VAR, "Model Town, DHA"),
                (SUMMARY_MATCH_VAR, "insensitive"),
                (CSV_LAYOUT_VAR, "products-first"),
            ]),
        )
        .unwrap();

        assert_eq!(config.branches.names(), ["Model Town".to_string(), "DHA".to_string()]);
        assert_eq!(config.summary_match, SummaryMatch::CaseInsensitive);
        assert_eq!(config.layout, CsvLayout::ProductsFirst);
    }

    #[test]
    fn test_overrides_beat_environment() {
        let overrides = ConfigOverrides {
            branches: Some("Awaisia".to_string()),
            summary_match: None,
            layout: Some("branches-first".to_string()),
        };
        let config = AnalyzerConfig::resolve(
            overrides,
            lookup(&[(BRANCHES_VAR, "DHA"), (CSV_LAYOUT_VAR, "products-first")]),
        )
        .unwrap();

        assert_eq!(config.branches.names(), ["Awaisia".to_string()]);
        assert_eq!(config.layout, CsvLayout::BranchesFirst);
    }

    #[test]
    fn test_blank_branch_list_is_rejected() {
        let err = AnalyzerConfig::resolve(ConfigOverrides::default(), lookup(&[(BRANCHES_VAR, " , ")]))
            .unwrap_err();
        assert!(matches!(err, SalesError::Config(_)));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let err = AnalyzerConfig::resolve(
            ConfigOverrides::default(),
            lookup(&[(SUMMARY_MATCH_VAR, "loose")]),
        )
        .unwrap_err();
        assert!(matches!(err, SalesError::Config(_)));
    }
}
