use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{AircraftSummary, SummaryMetrics};
use crate::data::model::{columns, CrashTable};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// `"country_region"` → `"Country Region"`.
fn filter_label(column: &str) -> String {
    column
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

enum FilterAction {
    Toggle(String, String),
    All(String),
    None(String),
}

/// Render the left filter panel: one searchable multiselect per column.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut actions: Vec<FilterAction> = Vec::new();
    let n_active = state.filters.values().filter(|s| !s.is_empty()).count();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for col in columns::FILTERABLE {
                let Some(all_values) = table.unique_values.get(col) else {
                    continue;
                };
                let selected = state.filters.get(col);

                // Show count of selected / total in the header
                let n_selected = selected.map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", filter_label(col));

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                actions.push(FilterAction::All(col.to_string()));
                            }
                            if ui.small_button("None").clicked() {
                                actions.push(FilterAction::None(col.to_string()));
                            }
                        });

                        let query = state.search.entry(col.to_string()).or_default();
                        ui.add(egui::TextEdit::singleline(query).hint_text("Search…"));
                        let needle = query.to_lowercase();

                        ScrollArea::vertical()
                            .id_salt(col)
                            .max_height(240.0)
                            .show(ui, |ui: &mut Ui| {
                                let visible = all_values
                                    .iter()
                                    .filter(|v| needle.is_empty() || v.to_lowercase().contains(&needle));
                                for val in visible {
                                    let mut checked = selected.is_some_and(|s| s.contains(val));
                                    if ui.checkbox(&mut checked, val.as_str()).changed() {
                                        actions.push(FilterAction::Toggle(col.to_string(), val.clone()));
                                    }
                                }
                            });
                    });
            }

            if n_active == 0 {
                ui.add_space(6.0);
                ui.label(RichText::new("No filters: showing every crash.").weak());
            }
        });

    for action in actions {
        match action {
            FilterAction::Toggle(col, val) => state.toggle_filter_value(&col, &val),
            FilterAction::All(col) => state.select_all(&col),
            FilterAction::None(col) => state.select_none(&col),
        }
    }
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

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} crashes loaded, {} visible",
                table.len(),
                state.snapshot.view.indices.len()
            ));
        }

        if let Some(report) = &state.report {
            if report.duplicates_removed > 0 {
                ui.separator();
                ui.label(format!("{} duplicate rows removed", report.duplicates_removed));
            }
        }

        for warning in &state.snapshot.view.warnings {
            ui.separator();
            ui.label(RichText::new(warning).color(Color32::from_rgb(230, 160, 30)));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric row and tables
// ---------------------------------------------------------------------------

pub fn metrics_row(ui: &mut Ui, metrics: &SummaryMetrics) {
    let cells = [
        ("Crashes", metrics.crashes.to_string()),
        ("Total Fatalities", format!("{}", metrics.total_fatalities as i64)),
        ("People Aboard", format!("{}", metrics.people_aboard as i64)),
        ("Aircraft manufacturer", metrics.manufacturers.to_string()),
        ("People on ground", metrics.ground_distinct.to_string()),
    ];
    ui.columns(cells.len(), |cols: &mut [Ui]| {
        for (col, (title, value)) in cols.iter_mut().zip(cells) {
            col.label(RichText::new(title).weak());
            col.label(RichText::new(value).size(26.0).strong());
        }
    });
}

/// First rows of the filtered view, every column.
pub fn preview_table(ui: &mut Ui, table: &CrashTable, indices: &[usize]) {
    let rows = table.select(indices);
    ui.push_id("preview_table", |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), table.column_names.len())
                .header(20.0, |mut header| {
                    for name in &table.column_names {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for record in &rows {
                        body.row(18.0, |mut row| {
                            for name in &table.column_names {
                                row.col(|ui: &mut Ui| {
                                    ui.label(record.display(name));
                                });
                            }
                        });
                    }
                });
        });
    });
}

pub fn aircraft_table(ui: &mut Ui, rows: &[AircraftSummary]) {
    ui.push_id("aircraft_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(160.0))
            .columns(Column::auto().at_least(70.0), 4)
            .header(20.0, |mut header| {
                for title in ["aircraft", "Count", "fatalities_air", "ground", "aboard"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for r in rows {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(&r.aircraft);
                        });
                        for value in [r.count as f64, r.fatalities_air, r.ground, r.aboard] {
                            row.col(|ui: &mut Ui| {
                                ui.label(format!("{value:.0}"));
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open crash records")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_labels_are_title_cased() {
        assert_eq!(filter_label("operator"), "Operator");
        assert_eq!(filter_label("country_region"), "Country Region");
        assert_eq!(filter_label("aircraft_manufacturer"), "Aircraft Manufacturer");
    }
}
