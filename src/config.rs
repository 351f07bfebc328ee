use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::transform::FieldMapping;
use crate::stats::column::{NOT_AVAILABLE, NumericPolicy};
use crate::stats::summary::SurveyFields;

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// File looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "rusty-salary.json";

/// User-tunable settings. Every key is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Which source fields hold salary, category, country, …
    pub fields: SurveyFields,
    /// Treatment of unreadable numeric cells.
    pub numeric_policy: NumericPolicy,
    /// Label for records lacking a categorical field.
    pub missing_label: String,
    /// Initial |z| threshold of the outlier view.
    pub outlier_threshold: f64,
    /// Column treatment producing the working view.
    pub mapping: FieldMapping,
    /// Fields offered in the filter panel.
    pub filter_fields: Vec<String>,
    /// Units of each currency per 1 USD.
    pub exchange_rates: BTreeMap<String, f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fields: SurveyFields::default(),
            numeric_policy: NumericPolicy::default(),
            missing_label: NOT_AVAILABLE.to_string(),
            // empirical 68-95-99.7 rule
            outlier_threshold: 3.0,
            mapping: FieldMapping::default(),
            filter_fields: vec![
                "employee_residence".into(),
                "job_category".into(),
                "experience_level".into(),
                "employment_type".into(),
                "work_setting".into(),
            ],
            exchange_rates: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if !(config.outlier_threshold.is_finite() && config.outlier_threshold > 0.0) {
            anyhow::bail!("outlier_threshold must be a positive number");
        }
        Ok(config)
    }

    /// Config from [`CONFIG_FILE`] if it exists and is valid, defaults otherwise.
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            log::debug!("No {CONFIG_FILE} found, using defaults");
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {CONFIG_FILE}");
                config
            }
            Err(e) => {
                log::warn!("Ignoring {CONFIG_FILE}: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(AnalysisConfig::from_json("{}").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn partial_override() {
        let config = AnalysisConfig::from_json(
            r#"{
                "numeric_policy": "fail_fast",
                "fields": { "country": "company_location" },
                "mapping": { "drop": ["salary"], "rename": [["work_year", "year"]] },
                "exchange_rates": { "EUR": 0.9 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.numeric_policy, NumericPolicy::FailFast);
        assert_eq!(config.fields.country, "company_location");
        assert_eq!(config.fields.salary, "salary_in_usd");
        assert_eq!(config.mapping.rename, vec![("work_year".to_string(), "year".to_string())]);
        assert_eq!(config.exchange_rates["EUR"], 0.9);
        assert_eq!(config.outlier_threshold, 3.0);
    }

    #[test]
    fn invalid_threshold_is_rejected() {
        assert!(AnalysisConfig::from_json(r#"{ "outlier_threshold": -1 }"#).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "missing_label": "N/A" }"#).unwrap();
        assert_eq!(AnalysisConfig::load(&path).unwrap().missing_label, "N/A");
        assert!(AnalysisConfig::load(&dir.path().join("absent.json")).is_err());
    }
}
