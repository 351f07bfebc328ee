use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::AnalysisConfig;
use crate::currency::{BASE_CURRENCY, CurrencyConverter, FixedRates};
use crate::data::filter::{FilterState, carry_filter_state, field_values, filtered_indices};
use crate::data::loader;
use crate::data::model::RecordSet;
use crate::stats::engine::StatsEngine;
use crate::stats::error::StatsError;
use crate::stats::grouped::{GroupVariation, GroupedAggregate, grouped_mean, grouped_variation};
use crate::stats::outlier::{Cleanliness, OutlierSet, WorkingSet};
use crate::stats::summary::{
    CountrySummary, Insights, country_summary, insights, records_for_country,
};

// ---------------------------------------------------------------------------
// Queries offered in the side panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Query {
    #[default]
    TotalRecords,
    GlobalAverage,
    AverageByCountry,
    CountryRecords,
    CountryByCategory,
    CountrySummary,
    Outliers,
    Insights,
}

impl Query {
    pub const ALL: [Query; 8] = [
        Query::TotalRecords,
        Query::GlobalAverage,
        Query::AverageByCountry,
        Query::CountryRecords,
        Query::CountryByCategory,
        Query::CountrySummary,
        Query::Outliers,
        Query::Insights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Query::TotalRecords => "Total number of records",
            Query::GlobalAverage => "Global average salary",
            Query::AverageByCountry => "Average salary by country",
            Query::CountryRecords => "Records of a country",
            Query::CountryByCategory => "Country × job category",
            Query::CountrySummary => "Country summary",
            Query::Outliers => "Outliers (z-score)",
            Query::Insights => "General insights",
        }
    }
}

// ---------------------------------------------------------------------------
// Results derived from the working view
// ---------------------------------------------------------------------------

/// Everything the views display, recomputed whenever the working view changes.
pub struct Analysis {
    pub global_mean: Result<f64, StatsError>,
    pub global_std_dev: Result<f64, StatsError>,
    /// `(lowest, highest)` salary of the view.
    pub salary_range: Result<(f64, f64), StatsError>,
    pub by_country: Result<Vec<GroupVariation>, StatsError>,
    pub by_country_category: Result<GroupedAggregate, StatsError>,
    pub insights: Insights,
    /// Sorted distinct countries of the view.
    pub countries: Vec<String>,
}

impl Analysis {
    pub fn compute(view: &RecordSet, config: &AnalysisConfig) -> Self {
        let f = &config.fields;
        let policy = config.numeric_policy;
        let label = config.missing_label.as_str();

        let country = [f.country.as_str()];
        let mut by_country = grouped_variation(view, &country, &f.salary, policy, label);
        if let Ok(rows) = &mut by_country {
            rows.sort_by(|a, b| a.key.cmp(&b.key));
        }
        let country_category = [f.country.as_str(), f.job_category.as_str()];
        let mut by_country_category =
            grouped_mean(view, &country_category, &f.salary, policy, label);
        if let Ok(rows) = &mut by_country_category {
            rows.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let engine = StatsEngine::new(view, policy, label);
        Self {
            global_mean: engine.mean_of(&f.salary),
            global_std_dev: engine.std_dev_of(&f.salary),
            salary_range: engine.range_of(&f.salary),
            by_country,
            by_country_category,
            insights: insights(view, f, policy, label),
            countries: view.unique_values(&f.country).into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

const MIN_SLIDER_THRESHOLD: f64 = 0.5;
const MAX_SLIDER_THRESHOLD: f64 = 6.0;

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,

    /// Exchange-rate source for the country summary.
    pub converter: Box<dyn CurrencyConverter>,

    /// Source records, field mapping and the (possibly cleaned) working view.
    pub working: Option<WorkingSet>,

    /// Derived results for the current working view.
    pub analysis: Option<Analysis>,

    /// File the source was loaded from.
    pub source_path: Option<PathBuf>,

    pub query: Query,

    /// Per-field filter selections for the records view.
    pub filters: FilterState,

    /// All values each filter field can take in the current view.
    pub filter_values: BTreeMap<String, BTreeSet<String>>,

    /// Every value offered so far for the loaded dataset, per field.
    pub filter_seen: BTreeMap<String, BTreeSet<String>>,

    /// Indices of view records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Country chosen in the country views.
    pub country: Option<String>,

    /// Country isolated in the country × category table (`None` = all).
    pub isolate_country: Option<String>,

    /// Currency of the country summary.
    pub currency: String,

    /// |z| threshold of the outlier view.
    pub threshold: f64,

    /// Latest classification of the working view.
    pub outliers: Option<Result<OutlierSet, StatsError>>,

    /// Removal / restore awaiting a second click.
    pub confirm_removal: bool,
    pub confirm_restore: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        let converter = Box::new(FixedRates::new(config.exchange_rates.clone()));
        Self::with_converter(config, converter)
    }

    pub fn with_converter(config: AnalysisConfig, converter: Box<dyn CurrencyConverter>) -> Self {
        Self {
            threshold: config.outlier_threshold,
            config,
            converter,
            working: None,
            analysis: None,
            source_path: None,
            query: Query::default(),
            filters: FilterState::default(),
            filter_values: BTreeMap::new(),
            filter_seen: BTreeMap::new(),
            visible_indices: Vec::new(),
            country: None,
            isolate_country: None,
            currency: BASE_CURRENCY.to_string(),
            outliers: None,
            confirm_removal: false,
            confirm_restore: false,
            status_message: None,
        }
    }

    /// Current working view, if a dataset is loaded.
    pub fn view(&self) -> Option<&RecordSet> {
        self.working.as_ref().map(WorkingSet::view)
    }

    pub fn cleanliness(&self) -> Cleanliness {
        self.working
            .as_ref()
            .map(WorkingSet::state)
            .unwrap_or_default()
    }

    /// Load a file and make it the new source.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(source) => {
                self.source_path = Some(path.to_path_buf());
                self.set_dataset(source);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded source, derive the working view and all results.
    pub fn set_dataset(&mut self, source: RecordSet) {
        self.working = Some(WorkingSet::new(source, self.config.mapping.clone()));
        self.filters.clear();
        self.filter_seen.clear();
        self.country = None;
        self.isolate_country = None;
        self.status_message = None;
        self.refresh();
    }

    /// Recompute everything derived from the working view.
    pub fn refresh(&mut self) {
        let Some(view) = self.view() else {
            return;
        };
        let analysis = Analysis::compute(view, &self.config);
        let values = field_values(view, &self.config.filter_fields, &self.config.missing_label);

        if self
            .country
            .as_ref()
            .is_some_and(|c| !analysis.countries.contains(c))
        {
            self.country = None;
        }
        if self.country.is_none() {
            self.country = analysis.countries.first().cloned();
        }

        self.filters = carry_filter_state(&self.filters, &self.filter_seen, &values);
        for (field, vals) in &values {
            self.filter_seen
                .entry(field.clone())
                .or_default()
                .extend(vals.iter().cloned());
        }
        self.filter_values = values;
        self.analysis = Some(analysis);
        self.confirm_removal = false;
        self.confirm_restore = false;
        self.refilter();
        self.detect_outliers();
    }

    /// Recompute `visible_indices` after filter change.
    pub fn refilter(&mut self) {
        if let Some(view) = self.working.as_ref().map(WorkingSet::view) {
            self.visible_indices =
                filtered_indices(view, &self.filters, &self.config.missing_label);
        }
    }

    /// Toggle a single value in a field's filter.
    pub fn toggle_filter_value(&mut self, field: &str, value: &str) {
        let selected = self.filters.entry(field.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a field.
    pub fn select_all(&mut self, field: &str) {
        if let Some(all_vals) = self.filter_values.get(field) {
            self.filters.insert(field.to_string(), all_vals.clone());
            self.refilter();
        }
    }

    /// Deselect all values in a field.
    pub fn select_none(&mut self, field: &str) {
        self.filters.insert(field.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Bounds of the threshold slider, widened to hold the configured threshold.
    pub fn threshold_range(&self) -> RangeInclusive<f64> {
        let configured = self.config.outlier_threshold;
        MIN_SLIDER_THRESHOLD.min(configured)..=MAX_SLIDER_THRESHOLD.max(configured)
    }

    /// Classify the salary field of the view at the current threshold.
    pub fn detect_outliers(&mut self) {
        self.outliers = self.working.as_ref().map(|ws| {
            ws.detect(&self.config.fields.salary, self.threshold, self.config.numeric_policy)
        });
        self.confirm_removal = false;
    }

    /// Remove the flagged rows from the working view.
    pub fn remove_outliers(&mut self) {
        let (Some(ws), Some(Ok(flagged))) = (self.working.as_mut(), self.outliers.as_ref()) else {
            return;
        };
        match ws.remove(flagged) {
            Ok(0) => self.status_message = Some("No outliers to remove.".into()),
            Ok(n) => self.status_message = Some(format!("{n} outliers removed.")),
            Err(e) => {
                log::error!("Outlier removal failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.refresh();
    }

    /// Rebuild the working view from the untouched source.
    pub fn restore(&mut self) {
        let Some(ws) = self.working.as_mut() else {
            return;
        };
        if ws.restore() {
            self.status_message = Some("Original data restored.".into());
            self.refresh();
        } else {
            self.status_message = Some("No changes were made to the dataset.".into());
            self.confirm_restore = false;
        }
    }

    /// Summary of `country` in the selected currency.
    pub fn country_summary(&self, country: &str) -> Result<Option<CountrySummary>> {
        let Some(view) = self.view() else {
            return Ok(None);
        };
        let summary = country_summary(
            view,
            country,
            &self.config.fields,
            self.config.numeric_policy,
            &self.config.missing_label,
        )?;
        let rate = self.converter.rate(BASE_CURRENCY, &self.currency)?;
        Ok(summary.map(|s| s.scaled(rate)))
    }

    /// Visible records of `country`.
    pub fn country_records(&self, country: &str) -> Option<RecordSet> {
        let view = self.view()?;
        let visible = view.select(&self.visible_indices);
        Some(records_for_country(&visible, country, &self.config.fields))
    }

    /// Write the visible records of `country` to `<country>_data.csv`.
    pub fn export_country(&mut self, country: &str) {
        let Some(records) = self.country_records(country) else {
            return;
        };
        let path = PathBuf::from(export_file_name(country));
        self.status_message = Some(match loader::write_csv(&path, &records) {
            Ok(()) => format!("{} file created.", path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Failed to export the data: {e:#}")
            }
        });
    }
}

/// `<country>_data.csv` in the working directory. Separators in the country
/// name are replaced so the file cannot land anywhere else.
fn export_file_name(country: &str) -> String {
    let stem: String = country
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    format!("{stem}_data.csv")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn survey() -> RecordSet {
        let mut rows: Vec<_> = (0..30)
            .map(|i| {
                let salary = (50_000 + (i % 7) * 1_000).to_string();
                let country = if i % 2 == 0 { "Spain" } else { "Germany" };
                record(&[
                    ("work_year", if i % 3 == 0 { "2022" } else { "2023" }),
                    ("job_title", "Data Analyst"),
                    ("job_category", "Data Analysis"),
                    ("employee_residence", country),
                    ("employment_type", "Full-time"),
                    ("salary_in_usd", salary.as_str()),
                ])
            })
            .collect();
        rows.push(record(&[
            ("work_year", "2023"),
            ("job_category", "Leadership"),
            ("employee_residence", "Spain"),
            ("employment_type", "Contract"),
            ("salary_in_usd", "900000"),
        ]));
        RecordSet::from_records(rows)
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(AnalysisConfig::default());
        state.set_dataset(survey());
        state
    }

    #[test]
    fn loading_derives_view_and_results() {
        let state = loaded();
        let view = state.view().unwrap();
        assert_eq!(view.len(), 31);
        assert!(!view.has_field("job_title"));
        let analysis = state.analysis.as_ref().unwrap();
        assert_eq!(analysis.countries, vec!["Germany", "Spain"]);
        assert_eq!(state.country.as_deref(), Some("Germany"));
        assert_eq!(state.visible_indices.len(), 31);
        assert_eq!(analysis.by_country.as_ref().unwrap()[0].key, vec!["Germany"]);
    }

    #[test]
    fn remove_then_restore_through_state() {
        let mut state = loaded();
        let flagged = state.outliers.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(flagged.len(), 1);

        state.remove_outliers();
        assert_eq!(state.cleanliness(), Cleanliness::Cleaned);
        assert_eq!(state.view().unwrap().len(), 30);

        state.restore();
        assert_eq!(state.cleanliness(), Cleanliness::Raw);
        assert_eq!(state.view().unwrap().len(), 31);

        state.restore();
        assert_eq!(
            state.status_message.as_deref(),
            Some("No changes were made to the dataset.")
        );
    }

    #[test]
    fn filter_choices_survive_remove_and_restore() {
        let mut state = loaded();
        state.toggle_filter_value("employment_type", "Contract");
        assert_eq!(state.country_records("Spain").unwrap().len(), 15);

        state.remove_outliers();
        assert_eq!(state.country_records("Spain").unwrap().len(), 15);
        state.restore();
        assert_eq!(state.view().unwrap().len(), 31);
        assert_eq!(state.country_records("Spain").unwrap().len(), 15);

        state.set_dataset(survey());
        assert_eq!(state.country_records("Spain").unwrap().len(), 16);
    }

    #[test]
    fn export_name_stays_in_working_directory() {
        assert_eq!(export_file_name("Spain"), "Spain_data.csv");
        assert_eq!(export_file_name("../etc/passwd"), ".._etc_passwd_data.csv");
        assert_eq!(export_file_name("a\\b"), "a_b_data.csv");
        let name = export_file_name("/tmp/x");
        assert_eq!(Path::new(&name).file_name().and_then(|n| n.to_str()), Some(name.as_str()));
    }

    #[test]
    fn slider_range_holds_configured_threshold() {
        let state = AppState::new(AnalysisConfig::default());
        assert_eq!(state.threshold_range(), 0.5..=6.0);

        let mut config = AnalysisConfig::default();
        config.outlier_threshold = 8.5;
        assert_eq!(AppState::new(config).threshold_range(), 0.5..=8.5);

        let mut config = AnalysisConfig::default();
        config.outlier_threshold = 0.2;
        assert_eq!(AppState::new(config).threshold_range(), 0.2..=6.0);
    }

    #[test]
    fn summary_in_another_currency() {
        let mut config = AnalysisConfig::default();
        config.exchange_rates.insert("EUR".into(), 0.5);
        let mut state = AppState::new(config);
        state.set_dataset(survey());

        let usd = state.country_summary("Germany").unwrap().unwrap();
        state.currency = "EUR".into();
        let eur = state.country_summary("Germany").unwrap().unwrap();
        assert_eq!(eur.average, usd.average * 0.5);

        state.currency = "JPY".into();
        assert!(state.country_summary("Germany").is_err());
    }

    #[test]
    fn filters_narrow_country_records() {
        let mut state = loaded();
        assert_eq!(state.country_records("Spain").unwrap().len(), 16);
        state.toggle_filter_value("employment_type", "Contract");
        assert_eq!(state.country_records("Spain").unwrap().len(), 15);
        state.select_none("employment_type");
        assert!(state.country_records("Spain").unwrap().is_empty());
        state.select_all("employment_type");
        assert_eq!(state.country_records("Spain").unwrap().len(), 16);
    }
}
