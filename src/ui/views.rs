use eframe::egui::{self, Color32, RichText, Ui};

use crate::currency::{BASE_CURRENCY, format_currency};
use crate::state::{AppState, Query};
use crate::stats::column::{numeric_column, parse_number};
use crate::stats::error::StatsError;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Central panel – one view per query
// ---------------------------------------------------------------------------

pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    if state.working.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a salary survey to start  (File → Open…)");
        });
        return;
    }

    ui.heading(state.query.label());
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.query {
            Query::TotalRecords => total_records(ui, state),
            Query::GlobalAverage => global_average(ui, state),
            Query::AverageByCountry => average_by_country(ui, state),
            Query::CountryRecords => country_records(ui, state),
            Query::CountryByCategory => country_by_category(ui, state),
            Query::CountrySummary => country_summary(ui, state),
            Query::Outliers => outliers(ui, state),
            Query::Insights => insights(ui, state),
        });
}

fn usd(amount: f64) -> String {
    format_currency(amount, BASE_CURRENCY)
}

fn usd_cell(raw: &str) -> String {
    parse_number(raw).map(usd).unwrap_or_else(|| raw.to_string())
}

fn error_label(ui: &mut Ui, err: &StatsError) {
    ui.label(RichText::new(err.to_string()).color(Color32::RED));
}

/// Combo box over the countries of the view. Returns the selection.
fn country_picker(ui: &mut Ui, state: &mut AppState, id: &str) -> Option<String> {
    let countries = state
        .analysis
        .as_ref()
        .map(|a| a.countries.clone())
        .unwrap_or_default();
    let current = state.country.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .width(220.0)
        .show_ui(ui, |ui: &mut Ui| {
            for c in &countries {
                if ui.selectable_label(current == *c, c.as_str()).clicked() {
                    state.country = Some(c.clone());
                }
            }
        });
    state.country.clone()
}

// ---------------------------------------------------------------------------
// 1. Totals
// ---------------------------------------------------------------------------

fn total_records(ui: &mut Ui, state: &mut AppState) {
    let Some(ws) = &state.working else { return };
    tables::key_value_grid(
        ui,
        "totals",
        &[
            ("Records in source", ws.source().len().to_string()),
            ("Records in view", ws.view().len().to_string()),
            ("Removed as outliers", ws.removed().to_string()),
            ("Fields in source", ws.source().field_names.len().to_string()),
            ("Fields in view", ws.view().field_names.join(", ")),
        ],
    );
}

// ---------------------------------------------------------------------------
// 2. Global average
// ---------------------------------------------------------------------------

fn global_average(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else { return };
    match &analysis.global_mean {
        Ok(m) => {
            let text = format!("The average salary in USD is {} per year.", usd(*m));
            ui.label(RichText::new(text).size(18.0));
        }
        Err(e) => error_label(ui, e),
    }
    ui.add_space(6.0);

    let spread = analysis.global_std_dev.as_ref().map(|sd| usd(*sd));
    let range = analysis
        .salary_range
        .as_ref()
        .map(|(lo, hi)| format!("{} to {}", usd(*lo), usd(*hi)));
    tables::key_value_grid(
        ui,
        "global_spread",
        &[
            ("Standard deviation", spread.unwrap_or_else(|e| e.to_string())),
            ("Salary range", range.unwrap_or_else(|e| e.to_string())),
        ],
    );
}

// ---------------------------------------------------------------------------
// 3. Average by country
// ---------------------------------------------------------------------------

fn average_by_country(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else { return };
    match &analysis.by_country {
        Ok(rows) => {
            let headers = vec![
                "Country".to_string(),
                "Average salary".to_string(),
                "Variation from global mean (%)".to_string(),
            ];
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|g| vec![g.key.join(" / "), usd(g.mean), format!("{:.2}", g.variation_pct)])
                .collect();
            tables::text_table(ui, "by_country", &headers, &cells);
        }
        Err(e) => error_label(ui, e),
    }
}

// ---------------------------------------------------------------------------
// 4. Records of a country
// ---------------------------------------------------------------------------

fn country_records(ui: &mut Ui, state: &mut AppState) {
    let mut export = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Country");
        let picked = country_picker(ui, state, "records_country");
        if let Some(c) = picked {
            if ui.button("Export CSV").clicked() {
                export = Some(c);
            }
        }
    });
    if let Some(c) = export {
        state.export_country(&c);
    }

    let Some(country) = state.country.clone() else { return };
    let Some(records) = state.country_records(&country) else { return };
    if records.is_empty() {
        ui.label(format!("No data found for {country}."));
        return;
    }
    ui.label(format!("{} records", records.len()));
    let salary = state.config.fields.salary.clone();
    tables::record_table(ui, "country_records", &records, &salary, usd_cell);
}

// ---------------------------------------------------------------------------
// 5. Country × job category
// ---------------------------------------------------------------------------

fn country_by_category(ui: &mut Ui, state: &mut AppState) {
    let countries = state
        .analysis
        .as_ref()
        .map(|a| a.countries.clone())
        .unwrap_or_default();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Isolate country");
        let current = state.isolate_country.clone().unwrap_or_else(|| "All countries".into());
        egui::ComboBox::from_id_salt("isolate_country")
            .selected_text(current)
            .width(220.0)
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(state.isolate_country.is_none(), "All countries").clicked() {
                    state.isolate_country = None;
                }
                for c in &countries {
                    let selected = state.isolate_country.as_deref() == Some(c.as_str());
                    if ui.selectable_label(selected, c.as_str()).clicked() {
                        state.isolate_country = Some(c.clone());
                    }
                }
            });
    });
    ui.add_space(4.0);

    let Some(analysis) = &state.analysis else { return };
    match &analysis.by_country_category {
        Ok(rows) => {
            let headers = vec![
                "Country".to_string(),
                "Job category".to_string(),
                "Average salary".to_string(),
            ];
            let cells: Vec<Vec<String>> = rows
                .iter()
                .filter(|(key, _)| {
                    state
                        .isolate_country
                        .as_ref()
                        .map_or(true, |c| key.first() == Some(c))
                })
                .map(|(key, m)| {
                    let mut row = key.clone();
                    row.push(usd(*m));
                    row
                })
                .collect();
            if cells.is_empty() {
                ui.label("Country not found.");
            } else {
                tables::text_table(ui, "by_category", &headers, &cells);
            }
        }
        Err(e) => error_label(ui, e),
    }
}

// ---------------------------------------------------------------------------
// 6. Country summary
// ---------------------------------------------------------------------------

fn country_summary(ui: &mut Ui, state: &mut AppState) {
    let currencies = state.converter.currencies();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Country");
        country_picker(ui, state, "summary_country");
        ui.label("Currency");
        egui::ComboBox::from_id_salt("summary_currency")
            .selected_text(state.currency.as_str())
            .show_ui(ui, |ui: &mut Ui| {
                for code in &currencies {
                    ui.selectable_value(&mut state.currency, code.clone(), code.as_str());
                }
            });
    });
    ui.add_space(4.0);

    let Some(country) = state.country.clone() else { return };
    match state.country_summary(&country) {
        Ok(Some(s)) => {
            let money = |v: f64| format_currency(v, &state.currency);
            tables::key_value_grid(
                ui,
                "summary",
                &[
                    ("Country", s.country.clone()),
                    ("Average salary", money(s.average)),
                    ("Number of responses", s.responses.to_string()),
                    ("Most common job", s.most_common_job.clone()),
                    ("Highest salary", money(s.highest)),
                    ("Lowest salary", money(s.lowest)),
                    ("Most common employment type", s.most_common_employment_type.clone()),
                ],
            );
        }
        Ok(None) => {
            ui.label(format!("No data found for {country}."));
        }
        Err(e) => {
            ui.label(RichText::new(format!("{e:#}")).color(Color32::RED));
        }
    }
}

// ---------------------------------------------------------------------------
// 7. Outliers
// ---------------------------------------------------------------------------

fn outliers(ui: &mut Ui, state: &mut AppState) {
    let range = state.threshold_range();
    let changed = ui
        .add(egui::Slider::new(&mut state.threshold, range).step_by(0.1).text("|z| threshold"))
        .changed();
    if changed {
        state.detect_outliers();
    }
    ui.label(
        RichText::new("A threshold of 3 follows the empirical 68-95-99.7 rule.")
            .small()
            .weak(),
    );
    ui.add_space(4.0);

    let (Some(ws), Some(result)) = (&state.working, &state.outliers) else {
        return;
    };
    let flagged = match result {
        Ok(flagged) => flagged,
        Err(e) => {
            error_label(ui, e);
            return;
        }
    };

    tables::key_value_grid(
        ui,
        "outlier_stats",
        &[
            ("Mean", usd(flagged.mean)),
            ("Standard deviation", usd(flagged.std_dev)),
            ("Total number of outliers", flagged.len().to_string()),
        ],
    );

    let salary = &state.config.fields.salary;
    if let Ok(column) = numeric_column(ws.view(), salary, state.config.numeric_policy) {
        plot::outlier_scatter(ui, &column, flagged);
    }

    if flagged.is_empty() {
        ui.label("No outliers found.");
        return;
    }

    if let Ok(rows) = flagged.select(ws.view()) {
        tables::record_table(ui, "outlier_rows", &rows, salary, usd_cell);
    }

    ui.add_space(6.0);
    let mut remove = false;
    if state.confirm_removal {
        ui.label("Are you sure you want to remove the outliers from the dataset?");
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Yes, remove").clicked() {
                remove = true;
            }
            if ui.button("Cancel").clicked() {
                state.confirm_removal = false;
            }
        });
    } else if ui.button("Remove outliers…").clicked() {
        state.confirm_removal = true;
    }
    if remove {
        state.remove_outliers();
    }
}

// ---------------------------------------------------------------------------
// 8. General insights
// ---------------------------------------------------------------------------

fn insights(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else { return };
    let report = &analysis.insights;

    ui.strong("Salary analysis");
    match &report.salary {
        Ok(s) => {
            tables::key_value_grid(
                ui,
                "salary_stats",
                &[
                    ("Responses", s.count.to_string()),
                    ("Global mean", usd(s.mean)),
                    ("Standard deviation (population)", usd(s.std_dev)),
                    ("Lowest salary", usd(s.min)),
                    ("Highest salary", usd(s.max)),
                ],
            );
            ui.label(format!(
                "Although the average salary is {}, a deviation of {} means many \
                 respondents earn well above or below it.",
                usd(s.mean),
                usd(s.std_dev)
            ));
        }
        Err(e) => error_label(ui, e),
    }
    ui.separator();

    ui.strong("Job category frequency");
    match &report.job_frequency {
        Ok(table) => plot::frequency_chart(ui, "job_frequency", table),
        Err(e) => error_label(ui, e),
    }
    ui.separator();

    ui.strong("Correlation between work year and salary");
    match &report.year_salary_correlation {
        Ok(r) => {
            let direction = if *r > 0.0 {
                "salary and year tend to move in the same direction"
            } else if *r < 0.0 {
                "salary tends to move in the opposite direction of year"
            } else {
                "no linear relationship"
            };
            ui.label(format!(
                "r = {r:.2}: {direction}. Values close to 1 or -1 indicate a strong correlation."
            ));
        }
        Err(e) => error_label(ui, e),
    }
    ui.separator();

    ui.strong("Tendency over time");
    match &report.tendency {
        Ok(t) => {
            let headers = vec!["Year".to_string(), "Average salary".to_string()];
            let cells: Vec<Vec<String>> = t.iter().map(|(y, m)| vec![y.clone(), usd(*m)]).collect();
            tables::text_table(ui, "tendency", &headers, &cells);
            plot::tendency_plot(ui, t);
        }
        Err(e) => error_label(ui, e),
    }
}
