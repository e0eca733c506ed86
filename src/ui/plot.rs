use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use chrono::Datelike;
use eframe::egui::{self, Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon};

use crate::color::ColorMap;
use crate::data::aggregate::{
    AircraftSummary, BinValue, CategoryTotal, DashboardSnapshot, DatedTotal, ImpactTotal,
    LocationCount, ScatterPoint, SeasonMetric, SeasonValue,
};
use crate::data::model::YearBin;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Axis formatter that prints `labels[i]` at integer position `i`.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| -> String {
        let idx = mark.value.round();
        if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn empty_notice(ui: &mut Ui) {
    ui.label(egui::RichText::new("No rows match the current filters.").italics());
}

/// One coloured bar per category. Horizontal charts put the first category
/// at the top.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    labels: &[String],
    values: &[f64],
    value_label: &str,
    horizontal: bool,
) {
    if labels.is_empty() {
        empty_notice(ui);
        return;
    }

    let colors = ColorMap::new(labels.iter().cloned());
    let n = labels.len();
    let position = |i: usize| if horizontal { (n - 1 - i) as f64 } else { i as f64 };

    let bars: Vec<Bar> = labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, &value))| {
            Bar::new(position(i), value)
                .width(0.7)
                .name(label)
                .fill(colors.color_for(label))
        })
        .collect();

    let mut axis_labels = labels.to_vec();
    if horizontal {
        axis_labels.reverse();
    }

    let mut chart = BarChart::new(bars).name(value_label);
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_boxed_zoom(true);
    if horizontal {
        chart = chart.horizontal();
        plot = plot
            .x_axis_label(value_label)
            .y_axis_formatter(category_axis(axis_labels))
            .include_x(0.0);
    } else {
        plot = plot
            .y_axis_label(value_label)
            .x_axis_formatter(category_axis(axis_labels))
            .include_y(0.0);
    }

    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

fn totals_bars(ui: &mut Ui, id: &str, rows: &[CategoryTotal], value_label: &str) {
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    category_bars(ui, id, &labels, &values, value_label, true);
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

pub fn top_operators(ui: &mut Ui, rows: &[CategoryTotal]) {
    totals_bars(ui, "top_operators", rows, "Total Fatalities");
}

pub fn top_manufacturers(ui: &mut Ui, rows: &[CategoryTotal]) {
    totals_bars(ui, "top_manufacturers", rows, "Total Fatalities");
}

const MAX_SLICE_STEPS: usize = 180;

/// Convex segments used to draw a slice sweeping `sweep` radians.
fn slice_steps(sweep: f64) -> usize {
    let steps = (sweep / TAU * MAX_SLICE_STEPS as f64).ceil();
    steps.clamp(1.0, MAX_SLICE_STEPS as f64) as usize
}

/// Countries as a donut: each slice is drawn from small convex segments.
/// Non-positive totals have no slice.
pub fn countries_donut(ui: &mut Ui, rows: &[CategoryTotal]) {
    let rows: Vec<&CategoryTotal> = rows.iter().filter(|r| r.value > 0.0).collect();
    let total: f64 = rows.iter().map(|r| r.value).sum();
    if rows.is_empty() || total <= 0.0 {
        empty_notice(ui);
        return;
    }

    let colors = ColorMap::new(rows.iter().map(|r| r.label.clone()));
    let (inner, outer) = (0.5, 1.0);

    Plot::new("countries_donut")
        .height(CHART_HEIGHT + 50.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for row in &rows {
                let sweep = row.value / total * TAU;
                let steps = slice_steps(sweep);
                let color = colors.color_for(&row.label);
                for s in 0..steps {
                    let a0 = start + sweep * s as f64 / steps as f64;
                    let a1 = start + sweep * (s + 1) as f64 / steps as f64;
                    let quad = vec![
                        [inner * a0.cos(), inner * a0.sin()],
                        [outer * a0.cos(), outer * a0.sin()],
                        [outer * a1.cos(), outer * a1.sin()],
                        [inner * a1.cos(), inner * a1.sin()],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(quad))
                            .fill_color(color)
                            .stroke(Stroke::new(0.0, color))
                            .name(format!("{} ({:.0})", row.label, row.value)),
                    );
                }
                start += sweep;
            }
        });
}

/// Fatalities per month, x in fractional years.
pub fn monthly_trend(ui: &mut Ui, rows: &[DatedTotal]) {
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let coords: Vec<[f64; 2]> = rows
        .iter()
        .map(|r| {
            let x = r.date.year() as f64 + r.date.month0() as f64 / 12.0;
            [x, r.fatalities_air]
        })
        .collect();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Fatalities")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(coords.clone())).name("Fatalities").width(1.5));
            plot_ui.points(Points::new(PlotPoints::from(coords)).radius(2.0));
        });
}

pub fn fatalities_by_year_bin(ui: &mut Ui, rows: &[BinValue]) {
    let labels: Vec<String> = rows.iter().map(|r| r.bin.to_string()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    category_bars(ui, "fatalities_by_year_bin", &labels, &values, "Total Fatalities", false);
}

pub fn air_vs_ground(ui: &mut Ui, rows: &[ImpactTotal]) {
    let labels: Vec<String> = rows.iter().map(|r| r.impact.to_string()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.fatalities).collect();
    category_bars(ui, "air_vs_ground", &labels, &values, "Total Fatalities", false);
}

pub fn top_locations(ui: &mut Ui, rows: &[LocationCount]) {
    let labels: Vec<String> = rows.iter().map(|r| r.location.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.crash_count as f64).collect();
    category_bars(ui, "top_locations", &labels, &values, "Number of Crashes", true);
}

pub fn aboard_vs_fatalities(ui: &mut Ui, rows: &[ScatterPoint]) {
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let points: PlotPoints = rows.iter().map(|p| [p.aboard, p.fatalities_air]).collect();

    Plot::new("aboard_vs_fatalities")
        .height(CHART_HEIGHT)
        .x_axis_label("People Aboard")
        .y_axis_label("Fatalities (Air)")
        .label_formatter(|_name, value| nearest_crash_label(rows, value))
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .radius(3.0)
                    .color(Color32::from_rgba_unmultiplied(70, 130, 220, 150))
                    .name("Crash"),
            );
        });
}

/// Hover text naming the crash closest to the cursor.
fn nearest_crash_label(rows: &[ScatterPoint], value: &PlotPoint) -> String {
    let nearest = rows.iter().min_by(|a, b| {
        let da = (a.aboard - value.x).hypot(a.fatalities_air - value.y);
        let db = (b.aboard - value.x).hypot(b.fatalities_air - value.y);
        da.total_cmp(&db)
    });
    match nearest {
        Some(p) => {
            let year = p.year.map(|y| format!("{y:.0}")).unwrap_or_else(|| "?".into());
            format!(
                "{} ({year})\naboard {:.0}, fatalities {:.0}",
                p.operator, p.aboard, p.fatalities_air
            )
        }
        None => String::new(),
    }
}

pub fn mean_aboard_by_year_bin(ui: &mut Ui, rows: &[BinValue]) {
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let coords: Vec<[f64; 2]> = rows
        .iter()
        .map(|r| [r.bin.index() as f64, r.value])
        .collect();
    let labels: Vec<String> = YearBin::ALL
        .iter()
        .map(|b| b.to_string())
        .collect();

    Plot::new("mean_aboard_by_year_bin")
        .height(CHART_HEIGHT)
        .y_axis_label("Average Aboard")
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(coords.clone())).name("Avg. Aboard").width(1.5));
            plot_ui.points(Points::new(PlotPoints::from(coords)).radius(3.0));
        });
}

/// Three bars per aircraft type: fatalities, ground deaths, people aboard.
pub fn aircraft_metrics(ui: &mut Ui, rows: &[AircraftSummary]) {
    if rows.is_empty() {
        empty_notice(ui);
        return;
    }
    let series: [(&str, Color32, fn(&AircraftSummary) -> f64); 3] = [
        ("fatalities_air", Color32::from_rgb(40, 160, 60), |r| r.fatalities_air),
        ("ground", Color32::from_rgb(50, 90, 220), |r| r.ground),
        ("aboard", Color32::from_rgb(220, 50, 50), |r| r.aboard),
    ];
    let labels: Vec<String> = rows.iter().map(|r| r.aircraft.clone()).collect();

    Plot::new("aircraft_metrics")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Count")
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .include_y(0.0)
        .show(ui, |plot_ui| {
            for (k, (name, color, value)) in series.iter().enumerate() {
                let offset = (k as f64 - 1.0) * 0.25;
                let bars: Vec<Bar> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, r)| Bar::new(i as f64 + offset, value(r)).width(0.25).name(&r.aircraft))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(*name).color(*color));
            }
        });
}

pub fn seasons(ui: &mut Ui, rows: &[SeasonValue], metric: SeasonMetric) {
    let labels: Vec<String> = rows.iter().map(|r| r.season.to_string()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
    category_bars(ui, "seasons", &labels, &values, metric.label(), false);
}

// ---------------------------------------------------------------------------
// Central page
// ---------------------------------------------------------------------------

/// Render every chart for the current snapshot.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a crash CSV to begin  (File → Open…)");
        });
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("✈ Airplane Crashes Dashboard");
            ui.add_space(8.0);

            let snap: &DashboardSnapshot = &state.snapshot;
            super::panels::metrics_row(ui, &snap.metrics);
            ui.separator();

            if let Some(table) = &state.table {
                let preview: Vec<usize> = snap
                    .view
                    .indices
                    .iter()
                    .copied()
                    .take(state.preview_rows)
                    .collect();
                super::panels::preview_table(ui, table, &preview);
            }

            section(ui, "Top 5 Operators by Fatalities", |ui| {
                top_operators(ui, &snap.top_operators)
            });
            section(ui, "Crashes by Countries", |ui| {
                countries_donut(ui, &snap.top_countries)
            });
            section(ui, "Aircraft with the highest crashes", |ui| {
                top_manufacturers(ui, &snap.top_manufacturers)
            });
            section(ui, "Monthly Crash Trend", |ui| {
                monthly_trend(ui, &snap.monthly_trend)
            });
            section(ui, "Crashes by Decade", |ui| {
                fatalities_by_year_bin(ui, &snap.fatalities_by_year_bin)
            });
            section(ui, "Air vs Ground Fatalities", |ui| {
                air_vs_ground(ui, &snap.air_vs_ground)
            });
            section(ui, "Locations With The Highest Crash", |ui| {
                top_locations(ui, &snap.top_locations)
            });
            section(ui, "Aboard vs. Fatalities (Air)", |ui| {
                aboard_vs_fatalities(ui, &snap.aboard_vs_fatalities)
            });
            section(ui, "Average People Aboard Over Time", |ui| {
                mean_aboard_by_year_bin(ui, &snap.mean_aboard_by_year_bin)
            });
            section(
                ui,
                "Top 10 aircraft: fatalities, people aboard and deaths on ground",
                |ui| {
                    super::panels::aircraft_table(ui, &snap.aircraft_summary);
                    ui.add_space(6.0);
                    aircraft_metrics(ui, &snap.aircraft_summary);
                },
            );

            ui.add_space(12.0);
            ui.heading("Airplane Crashes by Season");
            let mut metric = state.season_metric;
            egui::ComboBox::from_label("Choose metric to display")
                .selected_text(metric.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in SeasonMetric::ALL {
                        ui.selectable_value(&mut metric, option, option.label());
                    }
                });
            seasons(ui, &state.snapshot.seasons, state.snapshot.season_metric);
            if metric != state.season_metric {
                state.set_season_metric(metric);
            }
        });
}

fn section(ui: &mut Ui, title: &str, body: impl FnOnce(&mut Ui)) {
    ui.add_space(12.0);
    ui.heading(title);
    body(ui);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_segments_are_bounded() {
        assert_eq!(slice_steps(TAU), MAX_SLICE_STEPS);
        assert_eq!(slice_steps(TAU / 2.0), MAX_SLICE_STEPS / 2);
        assert_eq!(slice_steps(0.0), 1);
        // A slice far wider than a full turn still draws a bounded number.
        assert_eq!(slice_steps(1_000_001.0 * TAU), MAX_SLICE_STEPS);
    }

    #[test]
    fn category_axis_labels_integer_positions_only() {
        let fmt = category_axis(vec!["A".into(), "B".into()]);
        let mark = |value| GridMark { value, step_size: 1.0 };
        assert_eq!(fmt(mark(1.0), &(0.0..=1.0)), "B");
        assert_eq!(fmt(mark(0.5), &(0.0..=1.0)), "");
        assert_eq!(fmt(mark(-1.0), &(0.0..=1.0)), "");
    }
}
