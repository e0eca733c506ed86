use std::path::Path;

use anyhow::{Context, Result};

use crate::data::aggregate::{DashboardSnapshot, SeasonMetric};
use crate::data::clean::{clean, CleaningReport};
use crate::data::filter::{init_filter_state, FilterState};
use crate::data::loader::load_file;
use crate::data::model::CrashTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Cleaned table (None until a file loads). Never mutated once set.
    pub table: Option<CrashTable>,

    /// What the cleaning pipeline reported for the loaded file.
    pub report: Option<CleaningReport>,

    /// Per-column sidebar selections.
    pub filters: FilterState,

    /// Per-column search text for the sidebar lists.
    pub search: std::collections::BTreeMap<String, String>,

    /// Rows shown in the filtered-data preview.
    pub preview_rows: usize,

    /// Metric shown by the season chart.
    pub season_metric: SeasonMetric,

    /// Everything the central page renders (cached until filters change).
    pub snapshot: DashboardSnapshot,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load, clean and install a crash table from `path`.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let raw = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        let (table, report) = clean(&raw);
        log::info!(
            "Loaded {} crash records from {} with columns {:?}",
            table.len(),
            path.display(),
            table.column_names
        );
        self.set_table(table, report);
        Ok(())
    }

    /// Ingest a cleaned table and reset filters.
    pub fn set_table(&mut self, table: CrashTable, report: CleaningReport) {
        self.filters = init_filter_state();
        self.search.clear();
        self.snapshot = DashboardSnapshot::compute(&table, &self.filters, self.season_metric);
        self.status_message = if table.is_empty() {
            Some("The file contains no crash records.".to_string())
        } else {
            (!report.synthesized_columns.is_empty()).then(|| {
                format!(
                    "Missing columns treated as empty: {}",
                    report.synthesized_columns.join(", ")
                )
            })
        };
        self.table = Some(table);
        self.report = Some(report);
    }

    /// Recompute the snapshot after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.snapshot = DashboardSnapshot::compute(table, &self.filters, self.season_metric);
        }
    }

    /// Switch the season chart metric.
    pub fn set_season_metric(&mut self, metric: SeasonMetric) {
        if metric == self.season_metric {
            return;
        }
        self.season_metric = metric;
        if let Some(table) = &self.table {
            self.snapshot.set_season_metric(table, metric);
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(all_vals) = self.table.as_ref().and_then(|t| t.unique_values.get(column)) {
            self.filters.insert(column.to_string(), all_vals.clone());
            self.refilter();
        }
    }

    /// Clear a column's selection (no restriction).
    pub fn select_none(&mut self, column: &str) {
        self.filters.entry(column.to_string()).or_default().clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn loaded() -> AppState {
        let csv = "Operator,Country/Region,Aircraft Manufacturer,Year,Month,Fatalities (air)\n\
                   KLM,Netherlands,Fokker,1950,March,10\n\
                   Aeroflot,Russia,Tupolev,1970,June,80\n";
        let (table, report) = clean(&read_csv(csv.as_bytes()).unwrap());
        let mut state = AppState::default();
        state.set_table(table, report);
        state
    }

    #[test]
    fn new_table_starts_unfiltered() {
        let state = loaded();
        assert_eq!(state.snapshot.view.indices, [0, 1]);
        assert_eq!(state.snapshot.metrics.total_fatalities, 90.0);
        assert!(state.status_message.as_deref().unwrap().contains("aboard"));
    }

    #[test]
    fn toggling_a_value_filters_and_toggles_back() {
        let mut state = loaded();
        state.toggle_filter_value("operator", "KLM");
        assert_eq!(state.snapshot.view.indices, [0]);
        state.toggle_filter_value("operator", "KLM");
        assert_eq!(state.snapshot.view.indices, [0, 1]);
    }

    #[test]
    fn select_all_and_none_both_show_everything() {
        let mut state = loaded();
        state.select_all("country_region");
        assert_eq!(state.snapshot.view.indices.len(), 2);
        state.select_none("country_region");
        assert!(state.filters["country_region"].is_empty());
        assert_eq!(state.snapshot.view.indices.len(), 2);
    }

    #[test]
    fn season_metric_switch_updates_only_seasons() {
        let mut state = loaded();
        let before = state.snapshot.metrics;
        state.set_season_metric(SeasonMetric::TotalFatalities);
        assert_eq!(state.snapshot.season_metric, SeasonMetric::TotalFatalities);
        assert_eq!(state.snapshot.metrics, before);
    }

    #[test]
    fn header_only_file_reports_no_records() {
        let (table, report) = clean(&read_csv("Operator,Year\n".as_bytes()).unwrap());
        let mut state = AppState::default();
        state.set_table(table, report);
        assert!(state.table.as_ref().unwrap().is_empty());
        assert!(state.status_message.as_deref().unwrap().contains("no crash records"));
        assert_eq!(state.snapshot.metrics.crashes, 0);
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = loaded();
        let err = state.load_path(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("exist.csv"));
        assert!(state.table.is_some());
    }
}
