use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Record, RecordSet};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a salary record set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with field names, one record per line
/// * `.json`    – `[{ "work_year": 2023, "salary_in_usd": 95000, ... }, ...]`
/// * `.parquet` – any flat schema; every scalar column becomes a text field
///
/// Every cell is kept as text. Null / empty cells are left out of the record
/// so that extraction applies its documented fallback.
pub fn load_file(path: &Path) -> Result<RecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let set = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    log::info!(
        "Loaded {} records with {} fields from {}",
        set.len(),
        set.field_names.len(),
        path.display()
    );
    Ok(set)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with field names. Short rows are accepted; the
/// missing trailing cells are simply absent from that record.
fn load_csv(path: &Path) -> Result<RecordSet> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text from any reader into a [`RecordSet`].
pub fn read_csv<R: std::io::Read>(input: R) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut rec = Record::new();
        for (col_idx, value) in row.iter().enumerate() {
            let Some(name) = headers.get(col_idx) else {
                log::warn!("CSV row {row_no}: extra cell at column {col_idx} ignored");
                continue;
            };
            if !value.is_empty() {
                rec.insert(name.clone(), value.to_string());
            }
        }
        records.push(rec);
    }

    Ok(RecordSet::with_header(headers, records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "work_year": 2023, "job_category": "Data Science", "salary_in_usd": 95000 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RecordSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse records-oriented JSON text into a [`RecordSet`].
pub fn parse_json(text: &str) -> Result<RecordSet> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut rec = Record::new();
        for (key, val) in obj {
            if let Some(text) = json_to_text(val) {
                rec.insert(key.clone(), text);
            }
        }
        records.push(rec);
    }

    Ok(RecordSet::from_records(records))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Values are rendered with Arrow's display
/// formatter, so integers stay integers (`2023`, not `2023.0`).
fn load_parquet(path: &Path) -> Result<RecordSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let mut rec = Record::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let col = batch.column(col_idx);
                if col.is_null(row) {
                    continue;
                }
                let text = array_value_to_string(col, row).with_context(|| {
                    format!("Row {row}: failed to render '{}'", field.name())
                })?;
                if !text.is_empty() {
                    rec.insert(field.name().clone(), text);
                }
            }
            records.push(rec);
        }
    }

    Ok(RecordSet::with_header(header, records))
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write `set` as CSV (header = field order of the set, missing cells empty).
pub fn write_csv(path: &Path, set: &RecordSet) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv_to(file, set)?;
    log::info!("Exported {} records to {}", set.len(), path.display());
    Ok(())
}

fn write_csv_to<W: std::io::Write>(out: W, set: &RecordSet) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(&set.field_names)
        .context("writing CSV header")?;
    for (i, rec) in set.records.iter().enumerate() {
        let row: Vec<&str> = set
            .field_names
            .iter()
            .map(|f| rec.get(f).map(String::as_str).unwrap_or(""))
            .collect();
        writer
            .write_record(&row)
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE: &str = "work_year,job_category,employee_residence,salary_in_usd\n\
                          2023,Data Science,United States,150000\n\
                          2022,Data Engineering,Germany,80000\n\
                          2023,,Spain\n";

    #[test]
    fn csv_rows_become_records() {
        let set = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(
            set.field_names,
            vec!["work_year", "job_category", "employee_residence", "salary_in_usd"]
        );
        assert_eq!(set.value(1, "employee_residence"), Some("Germany"));
        // empty and missing trailing cells are absent
        assert_eq!(set.value(2, "job_category"), None);
        assert_eq!(set.value(2, "salary_in_usd"), None);
    }

    #[test]
    fn json_scalars_are_rendered_as_text() {
        let set = parse_json(
            r#"[{"work_year": 2023, "salary_in_usd": 95000.5,
                 "remote": true, "job_category": null}]"#,
        )
        .unwrap();
        assert_eq!(set.value(0, "work_year"), Some("2023"));
        assert_eq!(set.value(0, "salary_in_usd"), Some("95000.5"));
        assert_eq!(set.value(0, "remote"), Some("true"));
        assert_eq!(set.value(0, "job_category"), None);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(parse_json(r#"{"a": 1}"#).is_err());
        assert!(parse_json(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("salaries.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn csv_file_round_trip_through_export() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("jobs.csv");
        std::fs::File::create(&src)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();

        let set = load_file(&src).unwrap();
        let out = dir.path().join("Spain_data.csv");
        write_csv(&out, &set).unwrap();

        let again = load_file(&out).unwrap();
        assert_eq!(again, set);
    }

    #[test]
    fn parquet_columns_become_text_fields() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("work_year", DataType::Int64, false),
            Field::new("employee_residence", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2022, 2023])),
                Arc::new(StringArray::from(vec![Some("Canada"), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let set = load_file(&path).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.field_names, vec!["work_year", "employee_residence"]);
        assert_eq!(set.value(0, "work_year"), Some("2022"));
        assert_eq!(set.value(0, "employee_residence"), Some("Canada"));
        assert_eq!(set.value(1, "employee_residence"), None);
    }
}
