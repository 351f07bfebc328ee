use serde::{Deserialize, Serialize};

use super::model::{Record, RecordSet};

// ---------------------------------------------------------------------------
// FieldMapping – declarative column treatment
// ---------------------------------------------------------------------------

/// Declarative treatment that turns the loaded source into the working view:
/// drop some fields, then rename others.
///
/// The same mapping is re-applied to the untouched source whenever the
/// working view must be rebuilt (e.g. restoring after outlier removal).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Fields removed from every record.
    pub drop: Vec<String>,
    /// `(from, to)` renames applied after dropping.
    pub rename: Vec<(String, String)>,
}

impl Default for FieldMapping {
    /// Drops the redundant salary columns of the public "jobs in data" survey
    /// (local-currency salary, its currency and the free-text job title).
    fn default() -> Self {
        Self {
            drop: vec![
                "job_title".into(),
                "salary_currency".into(),
                "salary".into(),
            ],
            rename: Vec::new(),
        }
    }
}

impl FieldMapping {
    /// Mapping that leaves the source untouched.
    #[cfg(test)]
    pub fn identity() -> Self {
        Self {
            drop: Vec::new(),
            rename: Vec::new(),
        }
    }

    /// Name a source field ends up with in the working view, or `None` if dropped.
    pub fn target_name<'a>(&'a self, field: &'a str) -> Option<&'a str> {
        if self.drop.iter().any(|d| d == field) {
            return None;
        }
        Some(
            self.rename
                .iter()
                .find(|(from, _)| from == field)
                .map(|(_, to)| to.as_str())
                .unwrap_or(field),
        )
    }

    /// Build a new working view from `source`. The source is not modified.
    pub fn apply(&self, source: &RecordSet) -> RecordSet {
        let records: Vec<Record> = source
            .records
            .iter()
            .map(|rec| {
                rec.iter()
                    .filter_map(|(k, v)| {
                        self.target_name(k).map(|name| (name.to_string(), v.clone()))
                    })
                    .collect()
            })
            .collect();

        let header: Vec<String> = source
            .field_names
            .iter()
            .filter_map(|f| self.target_name(f).map(str::to_string))
            .collect();

        log::debug!(
            "Field mapping: {} -> {} fields ({} dropped, {} renamed)",
            source.field_names.len(),
            header.len(),
            self.drop.len(),
            self.rename.len()
        );

        RecordSet::with_header(header, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn source() -> RecordSet {
        RecordSet::with_header(
            vec![
                "job_title".into(),
                "employee_residence".into(),
                "salary_in_usd".into(),
            ],
            vec![
                record(&[
                    ("job_title", "Data Scientist"),
                    ("employee_residence", "Germany"),
                    ("salary_in_usd", "90000"),
                ]),
                record(&[("employee_residence", "France")]),
            ],
        )
    }

    #[test]
    fn drop_then_rename() {
        let mapping = FieldMapping {
            drop: vec!["job_title".into()],
            rename: vec![("employee_residence".into(), "Country".into())],
        };
        let view = mapping.apply(&source());
        assert_eq!(view.field_names, vec!["Country", "salary_in_usd"]);
        assert_eq!(view.value(0, "Country"), Some("Germany"));
        assert_eq!(view.value(0, "job_title"), None);
        assert_eq!(view.value(1, "Country"), Some("France"));
    }

    #[test]
    fn applying_twice_to_the_source_is_stable() {
        let src = source();
        let mapping = FieldMapping::default();
        assert_eq!(mapping.apply(&src), mapping.apply(&src));
        assert_eq!(src, source());
    }

    #[test]
    fn identity_keeps_everything() {
        let src = source();
        assert_eq!(FieldMapping::identity().apply(&src), src);
    }
}
