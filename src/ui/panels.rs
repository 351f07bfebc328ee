use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Query};
use crate::stats::outlier::Cleanliness;

// ---------------------------------------------------------------------------
// Left side panel – queries and filters
// ---------------------------------------------------------------------------

/// Render the left panel: query menu, restore action, record filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Queries");
    ui.separator();

    if state.working.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    for (n, query) in Query::ALL.iter().enumerate() {
        let text = format!("{}. {}", n + 1, query.label());
        if ui.selectable_label(state.query == *query, text).clicked() {
            state.query = *query;
        }
    }

    ui.add_space(6.0);
    restore_controls(ui, state);
    ui.separator();

    ui.heading("Filters");
    ui.label(RichText::new("Applies to the records view").small().weak());
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let fields: Vec<String> = state.filter_values.keys().cloned().collect();
    let all_values = state.filter_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for field in &fields {
                let Some(values) = all_values.get(field) else {
                    continue;
                };

                // Show count of selected / total in the header
                let n_selected = state
                    .filters
                    .get(field)
                    .map_or(0, |s| values.iter().filter(|v| s.contains(*v)).count());
                let header_text = format!("{field}  ({n_selected}/{})", values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        // Select all / none buttons
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(field);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(field);
                            }
                        });

                        for val in values {
                            let mut checked = state
                                .filters
                                .get(field)
                                .is_some_and(|s| s.contains(val));
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(field, val);
                            }
                        }
                    });
            }
        });
}

fn restore_controls(ui: &mut Ui, state: &mut AppState) {
    if state.cleanliness() == Cleanliness::Raw {
        if ui.button("Restore original data").clicked() {
            state.restore();
        }
        return;
    }

    if !state.confirm_restore {
        if ui.button("Restore original data…").clicked() {
            state.confirm_restore = true;
        }
        return;
    }

    ui.label("Restore the original data, outliers included?");
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Yes, restore").clicked() {
            state.restore();
        }
        if ui.button("Cancel").clicked() {
            state.confirm_restore = false;
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ws) = &state.working {
            let name = state
                .source_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} records loaded, {} in view",
                ws.source().len(),
                ws.view().len()
            ));

            ui.separator();

            let (text, color) = match ws.state() {
                Cleanliness::Raw => ("raw", Color32::GRAY),
                Cleanliness::Cleaned => ("outliers removed", Color32::LIGHT_GREEN),
            };
            ui.label(RichText::new(text).color(color));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") || msg.starts_with("Failed") {
                Color32::RED
            } else {
                Color32::LIGHT_BLUE
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary survey")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
