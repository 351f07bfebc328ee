use std::sync::Arc;

use anyhow::Context;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 600;

/// (job title, job category, base salary in USD)
const JOBS: [(&str, &str, f64); 8] = [
    ("Data Scientist", "Data Science and Research", 150_000.0),
    ("Research Scientist", "Data Science and Research", 165_000.0),
    ("Data Engineer", "Data Engineering", 140_000.0),
    ("Analytics Engineer", "Data Engineering", 135_000.0),
    ("Data Analyst", "Data Analysis", 105_000.0),
    ("Business Intelligence Analyst", "BI and Visualization", 110_000.0),
    ("Machine Learning Engineer", "Machine Learning and AI", 170_000.0),
    ("Data Architect", "Data Architecture and Modeling", 160_000.0),
];

/// (country, currency, units per USD, salary factor)
const COUNTRIES: [(&str, &str, f64, f64); 6] = [
    ("United States", "USD", 1.0, 1.0),
    ("United Kingdom", "GBP", 0.79, 0.65),
    ("Germany", "EUR", 0.92, 0.6),
    ("Canada", "CAD", 1.36, 0.75),
    ("Spain", "EUR", 0.92, 0.45),
    ("India", "INR", 83.0, 0.25),
];

const EXPERIENCE: [(&str, f64); 4] = [
    ("Entry-level", 0.6),
    ("Mid-level", 0.85),
    ("Senior", 1.1),
    ("Executive", 1.4),
];
const EMPLOYMENT: [&str; 4] = ["Full-time", "Full-time", "Contract", "Part-time"];
const SETTINGS: [&str; 3] = ["In-person", "Remote", "Hybrid"];
const SIZES: [&str; 3] = ["S", "M", "L"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Row {
    work_year: i64,
    job_title: &'static str,
    job_category: &'static str,
    salary_currency: &'static str,
    salary: i64,
    salary_in_usd: i64,
    employee_residence: &'static str,
    experience_level: &'static str,
    employment_type: &'static str,
    work_setting: &'static str,
    company_location: &'static str,
    company_size: &'static str,
}

const HEADER: [&str; 12] = [
    "work_year",
    "job_title",
    "job_category",
    "salary_currency",
    "salary",
    "salary_in_usd",
    "employee_residence",
    "experience_level",
    "employment_type",
    "work_setting",
    "company_location",
    "company_size",
];

fn generate_rows(rng: &mut SimpleRng) -> Vec<Row> {
    (0..ROWS)
        .map(|i| {
            let &(job_title, job_category, base) = rng.pick(&JOBS);
            let &(country, currency, rate, factor) = rng.pick(&COUNTRIES);
            let &(experience_level, seniority) = rng.pick(&EXPERIENCE);
            let work_year = 2020 + (rng.next_u64() % 4) as i64;
            let growth = 1.0 + 0.04 * (work_year - 2020) as f64;

            let mut usd = rng.gauss(base * factor * seniority * growth, 18_000.0).max(15_000.0);
            // A handful of extreme packages for the outlier view.
            if i % 97 == 13 {
                usd *= 4.0;
            }
            let salary_in_usd = usd.round() as i64;

            Row {
                work_year,
                job_title,
                job_category,
                salary_currency: currency,
                salary: (usd * rate).round() as i64,
                salary_in_usd,
                employee_residence: country,
                experience_level,
                employment_type: *rng.pick(&EMPLOYMENT),
                work_setting: *rng.pick(&SETTINGS),
                company_location: country,
                company_size: *rng.pick(&SIZES),
            }
        })
        .collect()
}

fn write_csv(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for r in rows {
        writer.write_record([
            r.work_year.to_string().as_str(),
            r.job_title,
            r.job_category,
            r.salary_currency,
            r.salary.to_string().as_str(),
            r.salary_in_usd.to_string().as_str(),
            r.employee_residence,
            r.experience_level,
            r.employment_type,
            r.work_setting,
            r.company_location,
            r.company_size,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> anyhow::Result<()> {
    let text = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let int = |f: fn(&Row) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(
        HEADER
            .iter()
            .map(|&name| {
                let dtype = match name {
                    "work_year" | "salary" | "salary_in_usd" => DataType::Int64,
                    _ => DataType::Utf8,
                };
                Field::new(name, dtype, false)
            })
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            int(|r| r.work_year),
            text(|r| r.job_title),
            text(|r| r.job_category),
            text(|r| r.salary_currency),
            int(|r| r.salary),
            int(|r| r.salary_in_usd),
            text(|r| r.employee_residence),
            text(|r| r.experience_level),
            text(|r| r.employment_type),
            text(|r| r.work_setting),
            text(|r| r.company_location),
            text(|r| r.company_size),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng);

    write_csv("jobs_in_data.csv", &rows)?;
    write_parquet("jobs_in_data.parquet", &rows)?;

    println!(
        "Wrote {} survey responses to jobs_in_data.csv and jobs_in_data.parquet",
        rows.len()
    );
    Ok(())
}
