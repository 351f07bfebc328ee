use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::RecordSet;

// ---------------------------------------------------------------------------
// Generic text table
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render `rows` under `headers` as a striped, resizable table.
///
/// `id` keeps several tables on one screen apart.
pub fn text_table(ui: &mut Ui, id: &str, headers: &[String], rows: &[Vec<String>]) {
    if headers.is_empty() {
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(480.0)
            .columns(Column::auto().at_least(60.0).clip(true), headers.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for i in 0..headers.len() {
                        row.col(|ui: &mut Ui| {
                            ui.label(cells.get(i).map(String::as_str).unwrap_or(""));
                        });
                    }
                });
            });
    });
}

/// Render every field of `records`, formatting the `money_field` cells with `fmt`.
pub fn record_table(
    ui: &mut Ui,
    id: &str,
    records: &RecordSet,
    money_field: &str,
    fmt: impl Fn(&str) -> String,
) {
    let headers = records.field_names.clone();
    let rows: Vec<Vec<String>> = records
        .records
        .iter()
        .map(|rec| {
            headers
                .iter()
                .map(|h| match rec.get(h) {
                    Some(v) if h == money_field => fmt(v),
                    Some(v) => v.clone(),
                    None => String::new(),
                })
                .collect()
        })
        .collect();
    text_table(ui, id, &headers, &rows);
}

/// Two-column key / value grid.
pub fn key_value_grid(ui: &mut Ui, id: &str, pairs: &[(&str, String)]) {
    egui::Grid::new(id)
        .num_columns(2)
        .striped(true)
        .spacing([24.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            for (k, v) in pairs {
                ui.strong(*k);
                ui.label(v.as_str());
                ui.end_row();
            }
        });
}
