//! Survey-level reports composed from the engine and the grouped aggregator.

use serde::{Deserialize, Serialize};

use super::column::{NumericPolicy, categorical_column, numeric_column};
use super::engine::{ColumnSummary, FrequencyTable, StatsEngine, mode, summarize};
use super::error::Result;
use super::grouped::tendency_over_key;
use crate::data::model::RecordSet;

/// Names of the survey fields the reports read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyFields {
    pub salary: String,
    pub job_category: String,
    pub country: String,
    pub employment_type: String,
    pub work_year: String,
}

impl Default for SurveyFields {
    fn default() -> Self {
        Self {
            salary: "salary_in_usd".into(),
            job_category: "job_category".into(),
            country: "employee_residence".into(),
            employment_type: "employment_type".into(),
            work_year: "work_year".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Country summary
// ---------------------------------------------------------------------------

/// Headline figures for the respondents of one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySummary {
    pub country: String,
    pub responses: usize,
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub most_common_job: String,
    pub most_common_employment_type: String,
}

impl CountrySummary {
    /// Same summary with the salary figures multiplied by `rate`.
    pub fn scaled(&self, rate: f64) -> CountrySummary {
        CountrySummary {
            average: self.average * rate,
            highest: self.highest * rate,
            lowest: self.lowest * rate,
            ..self.clone()
        }
    }
}

/// Records whose country field equals `country` exactly.
pub fn records_for_country(records: &RecordSet, country: &str, fields: &SurveyFields) -> RecordSet {
    let idx: Vec<usize> = (0..records.len())
        .filter(|&i| records.value(i, &fields.country) == Some(country))
        .collect();
    records.select(&idx)
}

/// Summarise one country. `Ok(None)` when no record belongs to it.
pub fn country_summary(
    records: &RecordSet,
    country: &str,
    fields: &SurveyFields,
    policy: NumericPolicy,
    fallback: &str,
) -> Result<Option<CountrySummary>> {
    let subset = records_for_country(records, country, fields);
    if subset.is_empty() {
        return Ok(None);
    }

    let salaries = numeric_column(&subset, &fields.salary, policy)?;
    let stats = summarize(&salaries)?;

    Ok(Some(CountrySummary {
        country: country.to_string(),
        responses: subset.len(),
        average: stats.mean,
        highest: stats.max,
        lowest: stats.min,
        most_common_job: mode(&categorical_column(&subset, &fields.job_category, fallback)?)?,
        most_common_employment_type: mode(&categorical_column(
            &subset,
            &fields.employment_type,
            fallback,
        )?)?,
    }))
}

// ---------------------------------------------------------------------------
// Global insights
// ---------------------------------------------------------------------------

/// The general-insights report. Each part fails independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub salary: Result<ColumnSummary>,
    pub job_frequency: Result<FrequencyTable>,
    pub year_salary_correlation: Result<f64>,
    pub tendency: Result<Vec<(String, f64)>>,
}

pub fn insights(
    records: &RecordSet,
    fields: &SurveyFields,
    policy: NumericPolicy,
    fallback: &str,
) -> Insights {
    let engine = StatsEngine::new(records, policy, fallback);
    Insights {
        salary: engine.summary_of(&fields.salary),
        job_frequency: engine.frequency_of(&fields.job_category),
        year_salary_correlation: engine.correlation_of(&fields.work_year, &fields.salary),
        tendency: tendency_over_key(records, &fields.work_year, &fields.salary, policy, fallback),
    }
}
