use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Number – a coerced numeric cell
// ---------------------------------------------------------------------------

/// A finite numeric value parsed from a text cell.
/// `CrashRecord` rows are deduplicated through a `HashSet`, so `Number` must be
/// `Eq + Hash`; comparison uses the IEEE total order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number(f64);

impl Number {
    /// Wrap a finite value. Non-finite input yields `None`; `-0.0` becomes `0.0`.
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Number(value + 0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The value as an integer, when it has no fractional part and fits `i64`.
    pub fn as_integer(self) -> Option<i64> {
        (self.0.fract() == 0.0 && self.0.abs() < i64::MAX as f64).then_some(self.0 as i64)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Number {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(i) => write!(f, "{i}"),
            None => write!(f, "{}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// YearBin – ordered historical periods
// ---------------------------------------------------------------------------

/// One of the ten labelled periods a crash year falls into.
///
/// Intervals are right-inclusive; the first one also includes its lower edge:
/// `[1908, 1920], (1920, 1933], … (2013, 2024]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum YearBin {
    Late1900s,
    Early1920s,
    Mid1930s,
    Mid1950s,
    Late1960s,
    Early1980s,
    Early1990s,
    Early2000s,
    Late2000s,
    Mid2020s,
}

impl YearBin {
    /// Every bin in declared order.
    pub const ALL: [YearBin; 10] = [
        YearBin::Late1900s,
        YearBin::Early1920s,
        YearBin::Mid1930s,
        YearBin::Mid1950s,
        YearBin::Late1960s,
        YearBin::Early1980s,
        YearBin::Early1990s,
        YearBin::Early2000s,
        YearBin::Late2000s,
        YearBin::Mid2020s,
    ];

    /// Bin edges; bin `i` spans `EDGES[i]..=EDGES[i + 1]`.
    pub const EDGES: [f64; 11] = [
        1908.0, 1920.0, 1933.0, 1944.0, 1955.0, 1967.0, 1980.0, 1991.0, 2002.0, 2013.0, 2024.0,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YearBin::Late1900s => "Late 1900s",
            YearBin::Early1920s => "Early 1920s",
            YearBin::Mid1930s => "Mid 1930s",
            YearBin::Mid1950s => "Mid 1950s",
            YearBin::Late1960s => "Late 1960s",
            YearBin::Early1980s => "Early 1980s",
            YearBin::Early1990s => "Early 1990s",
            YearBin::Early2000s => "Early 2000s",
            YearBin::Late2000s => "Late 2000s",
            YearBin::Mid2020s => "Mid 2020s",
        }
    }

    /// Position in the declared order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Assign a year to its bin, or `None` outside `[1908, 2024]`.
    pub fn from_year(year: f64) -> Option<YearBin> {
        if year == Self::EDGES[0] {
            return Some(YearBin::Late1900s);
        }
        Self::ALL
            .iter()
            .zip(Self::EDGES.windows(2))
            .find(|(_, edge)| year > edge[0] && year <= edge[1])
            .map(|(bin, _)| *bin)
    }
}

impl fmt::Display for YearBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Season
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    AutumnFall,
}

impl Season {
    pub const ALL: [Season; 4] = [
        Season::Winter,
        Season::Spring,
        Season::Summer,
        Season::AutumnFall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::AutumnFall => "Autumn/Fall",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a month name (any case) to its season.
    pub fn from_month(month: &str) -> Option<Season> {
        match month.to_lowercase().as_str() {
            "december" | "january" | "february" => Some(Season::Winter),
            "march" | "april" | "may" => Some(Season::Spring),
            "june" | "july" | "august" => Some(Season::Summer),
            "september" | "october" | "november" => Some(Season::AutumnFall),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CrashRecord – one cleaned row
// ---------------------------------------------------------------------------

/// Column names the pipeline reads or derives.
pub mod columns {
    pub const COUNTRY_REGION: &str = "country_region";
    pub const OPERATOR: &str = "operator";
    pub const AIRCRAFT_MANUFACTURER: &str = "aircraft_manufacturer";
    pub const AIRCRAFT: &str = "aircraft";
    pub const LOCATION: &str = "location";
    pub const MONTH: &str = "month";
    pub const YEAR: &str = "year";
    pub const DAY: &str = "day";
    pub const ABOARD: &str = "aboard";
    pub const FATALITIES_AIR: &str = "fatalities_air";
    pub const GROUND: &str = "ground";
    pub const MONTH_NUM: &str = "month_num";
    pub const DATE: &str = "date";
    pub const MONTH_NAME: &str = "month_name";
    pub const YEAR_BIN: &str = "year_bin";
    pub const SEASON: &str = "season";

    /// Text columns filled with `"Unknown"` and offered as sidebar filters.
    pub const FILTERABLE: [&str; 3] = [OPERATOR, COUNTRY_REGION, AIRCRAFT_MANUFACTURER];

    /// Columns coerced to numbers.
    pub const NUMERIC: [&str; 5] = [YEAR, DAY, ABOARD, FATALITIES_AIR, GROUND];

    /// Text columns read by name; anything else is carried as an extra column.
    pub const TEXT: [&str; 6] = [
        COUNTRY_REGION,
        OPERATOR,
        AIRCRAFT_MANUFACTURER,
        AIRCRAFT,
        LOCATION,
        MONTH,
    ];

    /// Columns the pipeline derives.
    pub const DERIVED: [&str; 5] = [MONTH_NUM, DATE, MONTH_NAME, YEAR_BIN, SEASON];
}

/// A crash record after cleaning and enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CrashRecord {
    pub country_region: String,
    pub operator: String,
    pub aircraft_manufacturer: String,
    pub aircraft: Option<String>,
    pub location: Option<String>,
    /// Month as stored in the source, lower-cased.
    pub month: Option<String>,
    pub year: Option<Number>,
    pub day: Option<Number>,
    pub aboard: Option<Number>,
    pub fatalities_air: Option<Number>,
    pub ground: Option<Number>,
    pub month_num: Option<u32>,
    /// First day of the crash month.
    pub date: Option<NaiveDate>,
    pub month_name: Option<&'static str>,
    pub year_bin: Option<YearBin>,
    pub season: Option<Season>,
    /// Source columns the dashboard does not interpret, by normalized name.
    pub extra: BTreeMap<String, Option<String>>,
}

impl CrashRecord {
    /// Look up a text column by normalized name.
    ///
    /// The outer `Option` is `None` when the record has no such text column;
    /// the inner one is the (possibly absent) value.
    pub fn text(&self, column: &str) -> Option<Option<&str>> {
        match column {
            columns::COUNTRY_REGION => Some(Some(self.country_region.as_str())),
            columns::OPERATOR => Some(Some(self.operator.as_str())),
            columns::AIRCRAFT_MANUFACTURER => Some(Some(self.aircraft_manufacturer.as_str())),
            columns::AIRCRAFT => Some(self.aircraft.as_deref()),
            columns::LOCATION => Some(self.location.as_deref()),
            columns::MONTH => Some(self.month.as_deref()),
            other => self.extra.get(other).map(|v| v.as_deref()),
        }
    }

    /// Render any column for tabular display; absent values render empty.
    pub fn display(&self, column: &str) -> String {
        fn num(v: Option<Number>) -> String {
            v.map(|n| n.to_string()).unwrap_or_default()
        }
        match column {
            columns::YEAR => num(self.year),
            columns::DAY => num(self.day),
            columns::ABOARD => num(self.aboard),
            columns::FATALITIES_AIR => num(self.fatalities_air),
            columns::GROUND => num(self.ground),
            columns::MONTH_NUM => self.month_num.map(|m| m.to_string()).unwrap_or_default(),
            columns::DATE => self.date.map(|d| d.to_string()).unwrap_or_default(),
            columns::MONTH_NAME => self.month_name.unwrap_or_default().to_string(),
            columns::YEAR_BIN => self.year_bin.map(|b| b.to_string()).unwrap_or_default(),
            columns::SEASON => self.season.map(|s| s.to_string()).unwrap_or_default(),
            other => self
                .text(other)
                .flatten()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// CrashTable – the cleaned dataset
// ---------------------------------------------------------------------------

/// The cleaned dataset. Built once per load and never mutated afterwards;
/// filtering produces index views over `records`.
#[derive(Debug, Clone, Default)]
pub struct CrashTable {
    pub records: Vec<CrashRecord>,
    /// Normalized column names in display order: source columns, then any
    /// synthesized ones, then the derived columns.
    pub column_names: Vec<String>,
    /// For each filterable column the sorted set of distinct values.
    pub unique_values: BTreeMap<String, BTreeSet<String>>,
}

impl CrashTable {
    /// Build the table and its filter-value index from cleaned records.
    pub fn from_records(records: Vec<CrashRecord>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for col in columns::FILTERABLE {
            let values = records
                .iter()
                .filter_map(|r| r.text(col).flatten())
                .map(str::to_string)
                .collect();
            unique_values.insert(col.to_string(), values);
        }
        CrashTable {
            records,
            column_names,
            unique_values,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Present and holding text, so it can be matched against filter values.
    pub fn is_text_column(&self, column: &str) -> bool {
        self.has_column(column)
            && !columns::NUMERIC.contains(&column)
            && !columns::DERIVED.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the rows at `indices`.
    pub fn select(&self, indices: &[usize]) -> Vec<&CrashRecord> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }

    /// Borrow every row.
    pub fn all(&self) -> Vec<&CrashRecord> {
        self.records.iter().collect()
    }
}
