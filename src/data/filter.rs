use std::collections::{BTreeMap, BTreeSet};

use super::model::{columns, CrashTable};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// An absent entry or an empty set means "no restriction on that column".
pub type FilterState = BTreeMap<String, BTreeSet<String>>;

/// An empty selection for every sidebar column.
pub fn init_filter_state() -> FilterState {
    columns::FILTERABLE
        .iter()
        .map(|col| (col.to_string(), BTreeSet::new()))
        .collect()
}

/// Rows passing the filters, plus a warning for every active filter that
/// names a column the table does not have, or one that is not text (such
/// filters are skipped).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView {
    pub indices: Vec<usize>,
    pub warnings: Vec<String>,
}

/// Return indices of records that pass all active filters.
///
/// A record passes a column filter when:
/// * The selection for that column is empty → passes (no constraint)
/// * The record's value for that column is in the selected set → passes
///
/// Filters are AND-ed across columns and OR-ed within one column.
pub fn filtered_view(table: &CrashTable, filters: &FilterState) -> FilteredView {
    let mut warnings = Vec::new();
    let active: Vec<(&str, &BTreeSet<String>)> = filters
        .iter()
        .filter(|(_, selected)| !selected.is_empty())
        .filter(|(col, _)| {
            if !table.has_column(col) {
                log::warn!("Filter column '{col}' not found; ignoring it");
                warnings.push(format!("Column '{col}' not found in the data."));
                return false;
            }
            if !table.is_text_column(col) {
                log::warn!("Filter column '{col}' is not a text column; ignoring it");
                warnings.push(format!("Column '{col}' cannot be filtered by value."));
                return false;
            }
            true
        })
        .map(|(col, selected)| (col.as_str(), selected))
        .collect();

    let indices = table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            active.iter().all(|(col, selected)| match rec.text(col) {
                Some(Some(value)) => selected.contains(value),
                _ => false,
            })
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView { indices, warnings }
}
