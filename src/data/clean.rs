use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate};

use super::loader::RawTable;
use super::model::{columns, CrashRecord, CrashTable, Number, Season, YearBin};

/// Sentinel for missing operator / country / manufacturer.
pub const UNKNOWN: &str = "Unknown";

/// Full month names in calendar order, as they are stored in the source.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// Cleaning report
// ---------------------------------------------------------------------------

/// What the pipeline did to a source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub source_rows: usize,
    pub duplicates_removed: usize,
    /// Named columns missing from the source and synthesized as all-absent.
    pub synthesized_columns: Vec<String>,
    /// Cleaned rows whose date could not be constructed.
    pub rows_without_date: usize,
}

// ---------------------------------------------------------------------------
// Per-cell steps
// ---------------------------------------------------------------------------

/// Trim, lower-case, spaces → `_`, drop parentheses, `/` → `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace(['(', ')'], "")
        .replace('/', "_")
}

/// Whitespace-only text is treated like a missing cell.
pub fn blank_to_absent(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

/// Replace an absent value with [`UNKNOWN`].
pub fn fill_unknown(cell: Option<String>) -> String {
    cell.unwrap_or_else(|| UNKNOWN.to_string())
}

/// Parse a numeric cell; anything that is not a finite number is absent.
pub fn coerce_numeric(cell: Option<&str>) -> Option<Number> {
    cell?.trim().parse::<f64>().ok().and_then(Number::new)
}

/// `"January"` → 1 … `"December"` → 12. Case-sensitive.
pub fn month_number(month: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == month)
        .map(|i| i as u32 + 1)
}

/// First day of the given month, or `None` if either part is absent or the
/// year is not a whole number.
pub fn construct_date(year: Option<Number>, month_num: Option<u32>) -> Option<NaiveDate> {
    let year = i32::try_from(year?.as_integer()?).ok()?;
    NaiveDate::from_ymd_opt(year, month_num?, 1)
}

/// Full English month name of a date.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full cleaning / enrichment pipeline over a raw table.
///
/// Missing named columns are synthesized as all-absent and reported; no row
/// is ever rejected for malformed content. Exact duplicates are removed last,
/// keeping the first occurrence.
pub fn clean(raw: &RawTable) -> (CrashTable, CleaningReport) {
    let mut report = CleaningReport {
        source_rows: raw.len(),
        ..Default::default()
    };

    // Normalized name → source index; the first of any clashing headers wins.
    let mut source_columns: Vec<String> = Vec::with_capacity(raw.headers.len());
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for (i, header) in raw.headers.iter().enumerate() {
        let name = normalize_column_name(header);
        if index.contains_key(&name) {
            log::warn!("Column '{header}' normalizes to duplicate name '{name}'; ignoring it");
            continue;
        }
        index.insert(name.clone(), i);
        source_columns.push(name);
    }

    let lookup = |name: &str| index.get(name).copied();
    for name in columns::TEXT.iter().chain(columns::NUMERIC.iter()) {
        if lookup(name).is_none() {
            log::warn!("Column '{name}' not found in source; treating it as empty");
            report.synthesized_columns.push(name.to_string());
        }
    }

    let extra_columns: Vec<(String, usize)> = source_columns
        .iter()
        .filter(|name| {
            let name = name.as_str();
            !columns::TEXT.contains(&name)
                && !columns::NUMERIC.contains(&name)
                && !columns::DERIVED.contains(&name)
        })
        .filter_map(|name| lookup(name).map(|i| (name.clone(), i)))
        .collect();

    let records: Vec<CrashRecord> = raw
        .rows
        .iter()
        .map(|row| {
            let cell = |name: &str| -> Option<String> {
                lookup(name)
                    .and_then(|i| row.get(i).cloned().flatten())
                    .and_then(|v| blank_to_absent(Some(v)))
            };
            let extra = extra_columns
                .iter()
                .map(|(name, i)| {
                    let value = blank_to_absent(row.get(*i).cloned().flatten());
                    (name.clone(), value)
                })
                .collect();
            enrich(cell, extra)
        })
        .collect();

    let before = records.len();
    let records = drop_duplicates(records);
    report.duplicates_removed = before - records.len();
    report.rows_without_date = records.iter().filter(|r| r.date.is_none()).count();

    let mut column_names = source_columns;
    column_names.extend(report.synthesized_columns.iter().cloned());
    column_names.retain(|c| !columns::DERIVED.contains(&c.as_str()));
    column_names.extend(columns::DERIVED.iter().map(|c| c.to_string()));

    log::info!(
        "Cleaned {} source rows into {} records ({} duplicates removed, {} without a date)",
        report.source_rows,
        records.len(),
        report.duplicates_removed,
        report.rows_without_date
    );

    (CrashTable::from_records(records, column_names), report)
}

/// Build one cleaned record from a row accessor.
fn enrich(
    cell: impl Fn(&str) -> Option<String>,
    extra: BTreeMap<String, Option<String>>,
) -> CrashRecord {
    let number = |name: &str| coerce_numeric(cell(name).as_deref());

    let year = number(columns::YEAR);
    let raw_month = cell(columns::MONTH);
    let month_num = raw_month.as_deref().and_then(month_number);
    let date = construct_date(year, month_num);
    let month = raw_month.map(|m| m.to_lowercase());
    let season = month.as_deref().and_then(Season::from_month);

    CrashRecord {
        country_region: fill_unknown(cell(columns::COUNTRY_REGION)),
        operator: fill_unknown(cell(columns::OPERATOR)),
        aircraft_manufacturer: fill_unknown(cell(columns::AIRCRAFT_MANUFACTURER)),
        aircraft: cell(columns::AIRCRAFT),
        location: cell(columns::LOCATION),
        month,
        year,
        day: number(columns::DAY),
        aboard: number(columns::ABOARD),
        fatalities_air: number(columns::FATALITIES_AIR),
        ground: number(columns::GROUND),
        month_num,
        date,
        month_name: date.map(month_name),
        year_bin: year.and_then(|y| YearBin::from_year(y.value())),
        season,
        extra,
    }
}

/// Remove rows equal in every field, keeping first occurrences in order.
pub fn drop_duplicates(records: Vec<CrashRecord>) -> Vec<CrashRecord> {
    let mut seen: HashSet<CrashRecord> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect()
}
