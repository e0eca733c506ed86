//! Summary metrics and the fixed set of chart tables.
//!
//! Every function takes a borrowed view (`&[&CrashRecord]`) and returns owned,
//! fixed-shape rows. An empty view yields zeros or empty tables, never a panic.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::filter::{filtered_view, FilterState, FilteredView};
use super::model::{CrashRecord, CrashTable, Number, Season, YearBin};

pub const TOP_OPERATORS: usize = 5;
pub const TOP_COUNTRIES: usize = 10;
pub const TOP_MANUFACTURERS: usize = 10;
pub const TOP_LOCATIONS: usize = 10;
pub const TOP_AIRCRAFT: usize = 10;

// ---------------------------------------------------------------------------
// Row types handed to the UI
// ---------------------------------------------------------------------------

/// Headline numbers for the metric row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryMetrics {
    pub crashes: usize,
    pub total_fatalities: f64,
    pub people_aboard: f64,
    /// Distinct manufacturers.
    pub manufacturers: usize,
    /// Distinct `ground` values. A count of distinct values, not a sum.
    pub ground_distinct: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedTotal {
    pub date: NaiveDate,
    pub fatalities_air: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinValue {
    pub bin: YearBin,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactTotal {
    pub impact: &'static str,
    pub fatalities: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationCount {
    pub location: String,
    pub crash_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub aboard: f64,
    pub fatalities_air: f64,
    pub year: Option<f64>,
    pub operator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSummary {
    pub aircraft: String,
    pub count: usize,
    pub fatalities_air: f64,
    pub ground: f64,
    pub aboard: f64,
}

/// What the season chart measures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeasonMetric {
    #[default]
    CrashCount,
    TotalFatalities,
}

impl SeasonMetric {
    pub const ALL: [SeasonMetric; 2] = [SeasonMetric::CrashCount, SeasonMetric::TotalFatalities];

    pub fn label(self) -> &'static str {
        match self {
            SeasonMetric::CrashCount => "Number of Crashes",
            SeasonMetric::TotalFatalities => "Total Fatalities",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeasonValue {
    pub season: Season,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

fn sum(rows: &[&CrashRecord], field: impl Fn(&CrashRecord) -> Option<Number>) -> f64 {
    rows.iter().filter_map(|r| field(r)).map(Number::value).sum()
}

pub fn summary_metrics(rows: &[&CrashRecord]) -> SummaryMetrics {
    let manufacturers: BTreeSet<&str> = rows
        .iter()
        .map(|r| r.aircraft_manufacturer.as_str())
        .collect();
    let ground: BTreeSet<Number> = rows.iter().filter_map(|r| r.ground).collect();

    SummaryMetrics {
        crashes: rows.len(),
        total_fatalities: sum(rows, |r| r.fatalities_air),
        people_aboard: sum(rows, |r| r.aboard),
        manufacturers: manufacturers.len(),
        ground_distinct: ground.len(),
    }
}

/// Group by `key`, sum `fatalities_air`, keep the `n` largest sums.
/// Equal sums keep key order.
fn top_fatalities_by<'a>(
    rows: &[&'a CrashRecord],
    key: impl Fn(&'a CrashRecord) -> Option<&'a str>,
    n: usize,
) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for &r in rows {
        if let Some(k) = key(r) {
            *groups.entry(k).or_default() += r.fatalities_air.map_or(0.0, Number::value);
        }
    }
    let mut totals: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(label, value)| CategoryTotal {
            label: label.to_string(),
            value,
        })
        .collect();
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals.truncate(n);
    totals
}

pub fn top_operators(rows: &[&CrashRecord]) -> Vec<CategoryTotal> {
    top_fatalities_by(rows, |r| Some(r.operator.as_str()), TOP_OPERATORS)
}

pub fn top_countries(rows: &[&CrashRecord]) -> Vec<CategoryTotal> {
    top_fatalities_by(rows, |r| Some(r.country_region.as_str()), TOP_COUNTRIES)
}

pub fn top_manufacturers(rows: &[&CrashRecord]) -> Vec<CategoryTotal> {
    top_fatalities_by(
        rows,
        |r| Some(r.aircraft_manufacturer.as_str()),
        TOP_MANUFACTURERS,
    )
}

/// Summed fatalities per constructed month, oldest first. Rows without a
/// date are left out.
pub fn monthly_trend(rows: &[&CrashRecord]) -> Vec<DatedTotal> {
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in rows {
        if let Some(date) = r.date {
            *months.entry(date).or_default() += r.fatalities_air.map_or(0.0, Number::value);
        }
    }
    months
        .into_iter()
        .map(|(date, fatalities_air)| DatedTotal {
            date,
            fatalities_air,
        })
        .collect()
}

/// Summed fatalities for every year bin in order, including empty bins.
pub fn fatalities_by_year_bin(rows: &[&CrashRecord]) -> Vec<BinValue> {
    let mut totals = vec![0.0; YearBin::ALL.len()];
    for r in rows {
        if let Some(bin) = r.year_bin {
            totals[bin.index()] += r.fatalities_air.map_or(0.0, Number::value);
        }
    }
    YearBin::ALL
        .iter()
        .map(|&bin| BinValue {
            bin,
            value: totals[bin.index()],
        })
        .collect()
}

/// Two rows: total air fatalities, then total ground fatalities.
pub fn air_vs_ground(rows: &[&CrashRecord]) -> [ImpactTotal; 2] {
    [
        ImpactTotal {
            impact: "Air Fatalities",
            fatalities: sum(rows, |r| r.fatalities_air),
        },
        ImpactTotal {
            impact: "Ground Fatalities",
            fatalities: sum(rows, |r| r.ground),
        },
    ]
}

/// Locations with the most crashes. Equal counts keep location order.
pub fn top_locations(rows: &[&CrashRecord]) -> Vec<LocationCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in rows {
        if let Some(loc) = r.location.as_deref() {
            *counts.entry(loc).or_default() += 1;
        }
    }
    let mut out: Vec<LocationCount> = counts
        .into_iter()
        .map(|(location, crash_count)| LocationCount {
            location: location.to_string(),
            crash_count,
        })
        .collect();
    out.sort_by(|a, b| b.crash_count.cmp(&a.crash_count));
    out.truncate(TOP_LOCATIONS);
    out
}

/// One point per row with both `aboard` and `fatalities_air` present.
pub fn aboard_vs_fatalities(rows: &[&CrashRecord]) -> Vec<ScatterPoint> {
    rows.iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                aboard: r.aboard?.value(),
                fatalities_air: r.fatalities_air?.value(),
                year: r.year.map(Number::value),
                operator: r.operator.clone(),
            })
        })
        .collect()
}

/// Mean `aboard` per year bin, in bin order. Bins without a qualifying row
/// are omitted.
pub fn mean_aboard_by_year_bin(rows: &[&CrashRecord]) -> Vec<BinValue> {
    let mut acc: BTreeMap<YearBin, (f64, usize)> = BTreeMap::new();
    for r in rows {
        if let (Some(bin), Some(aboard)) = (r.year_bin, r.aboard) {
            let entry = acc.entry(bin).or_default();
            entry.0 += aboard.value();
            entry.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(bin, (total, n))| BinValue {
            bin,
            value: total / n as f64,
        })
        .collect()
}

/// The most frequent aircraft types with their summed fatalities, ground
/// deaths and people aboard. Equal counts keep aircraft name order.
pub fn aircraft_summary(rows: &[&CrashRecord]) -> Vec<AircraftSummary> {
    let mut groups: BTreeMap<&str, AircraftSummary> = BTreeMap::new();
    for r in rows {
        let Some(aircraft) = r.aircraft.as_deref() else {
            continue;
        };
        let entry = groups.entry(aircraft).or_insert_with(|| AircraftSummary {
            aircraft: aircraft.to_string(),
            count: 0,
            fatalities_air: 0.0,
            ground: 0.0,
            aboard: 0.0,
        });
        entry.count += 1;
        entry.fatalities_air += r.fatalities_air.map_or(0.0, Number::value);
        entry.ground += r.ground.map_or(0.0, Number::value);
        entry.aboard += r.aboard.map_or(0.0, Number::value);
    }
    let mut out: Vec<AircraftSummary> = groups.into_values().collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out.truncate(TOP_AIRCRAFT);
    out
}

/// Crash count or summed fatalities per season, always in
/// `Winter, Spring, Summer, Autumn/Fall` order.
pub fn season_breakdown(rows: &[&CrashRecord], metric: SeasonMetric) -> Vec<SeasonValue> {
    let mut totals = vec![0.0; Season::ALL.len()];
    for r in rows {
        if let Some(season) = r.season {
            totals[season.index()] += match metric {
                SeasonMetric::CrashCount => 1.0,
                SeasonMetric::TotalFatalities => r.fatalities_air.map_or(0.0, Number::value),
            };
        }
    }
    Season::ALL
        .iter()
        .map(|&season| SeasonValue {
            season,
            value: totals[season.index()],
        })
        .collect()
}

// ---------------------------------------------------------------------------
// DashboardSnapshot – everything one interaction renders
// ---------------------------------------------------------------------------

/// All tables and metrics for one filter selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub view: FilteredView,
    pub metrics: SummaryMetrics,
    pub top_operators: Vec<CategoryTotal>,
    pub top_countries: Vec<CategoryTotal>,
    pub top_manufacturers: Vec<CategoryTotal>,
    pub monthly_trend: Vec<DatedTotal>,
    pub fatalities_by_year_bin: Vec<BinValue>,
    pub air_vs_ground: Vec<ImpactTotal>,
    pub top_locations: Vec<LocationCount>,
    pub aboard_vs_fatalities: Vec<ScatterPoint>,
    pub mean_aboard_by_year_bin: Vec<BinValue>,
    /// Computed over the whole table regardless of filters.
    pub aircraft_summary: Vec<AircraftSummary>,
    /// Computed over the whole table regardless of filters.
    pub seasons: Vec<SeasonValue>,
    pub season_metric: SeasonMetric,
}

impl DashboardSnapshot {
    pub fn compute(table: &CrashTable, filters: &FilterState, season_metric: SeasonMetric) -> Self {
        let view = filtered_view(table, filters);
        let rows = table.select(&view.indices);
        let all = table.all();

        DashboardSnapshot {
            metrics: summary_metrics(&rows),
            top_operators: top_operators(&rows),
            top_countries: top_countries(&rows),
            top_manufacturers: top_manufacturers(&rows),
            monthly_trend: monthly_trend(&rows),
            fatalities_by_year_bin: fatalities_by_year_bin(&rows),
            air_vs_ground: air_vs_ground(&rows).to_vec(),
            top_locations: top_locations(&rows),
            aboard_vs_fatalities: aboard_vs_fatalities(&rows),
            mean_aboard_by_year_bin: mean_aboard_by_year_bin(&rows),
            aircraft_summary: aircraft_summary(&all),
            seasons: season_breakdown(&all, season_metric),
            season_metric,
            view,
        }
    }

    /// Recompute only the season table after the metric selector changes.
    pub fn set_season_metric(&mut self, table: &CrashTable, metric: SeasonMetric) {
        self.season_metric = metric;
        self.seasons = season_breakdown(&table.all(), metric);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::init_filter_state;
    use crate::data::model::columns;

    fn num(v: f64) -> Option<Number> {
        Number::new(v)
    }

    fn crash(operator: &str, fatalities: Option<f64>) -> CrashRecord {
        CrashRecord {
            operator: operator.into(),
            country_region: "Unknown".into(),
            aircraft_manufacturer: "Unknown".into(),
            fatalities_air: fatalities.and_then(Number::new),
            ..Default::default()
        }
    }

    fn refs(rows: &[CrashRecord]) -> Vec<&CrashRecord> {
        rows.iter().collect()
    }

    #[test]
    fn top_operators_rank_by_summed_fatalities() {
        let rows = vec![
            crash("A", Some(5.0)),
            crash("A", Some(10.0)),
            crash("A", Some(5.0)),
            crash("B", Some(20.0)),
            crash("C", Some(3.0)),
        ];
        let top = top_operators(&refs(&rows));

        let top_two: BTreeSet<&str> = top[..2].iter().map(|t| t.label.as_str()).collect();
        assert_eq!(top_two, BTreeSet::from(["A", "B"]));
        assert!(top[..2].iter().all(|t| t.value == 20.0));
        assert_eq!(top[2].label, "C");
    }

    #[test]
    fn top_operators_keep_at_most_five() {
        let rows: Vec<CrashRecord> = (0..8)
            .map(|i| crash(&format!("op{i}"), Some(i as f64)))
            .collect();
        let top = top_operators(&refs(&rows));
        assert_eq!(top.len(), TOP_OPERATORS);
        assert_eq!(top[0].label, "op7");
        assert_eq!(top[4].label, "op3");
    }

    #[test]
    fn absent_fatalities_count_as_zero_in_group_sums() {
        let rows = vec![crash("A", None), crash("A", Some(2.0))];
        let top = top_operators(&refs(&rows));
        assert_eq!(top, vec![CategoryTotal { label: "A".into(), value: 2.0 }]);
    }

    #[test]
    fn summary_metrics_over_filtered_rows() {
        let mut a = crash("A", Some(5.0));
        a.aboard = num(10.0);
        a.ground = num(0.0);
        a.aircraft_manufacturer = "Boeing".into();
        let mut b = crash("B", Some(7.0));
        b.aboard = num(7.0);
        b.ground = num(0.0);
        let mut c = crash("C", None);
        c.ground = num(3.0);
        let rows = vec![a, b, c];

        let m = summary_metrics(&refs(&rows));
        assert_eq!(m.crashes, 3);
        assert_eq!(m.total_fatalities, 12.0);
        assert_eq!(m.people_aboard, 17.0);
        assert_eq!(m.manufacturers, 2);
    }

    #[test]
    fn people_on_ground_metric_counts_distinct_values_not_sum() {
        // Known oddity carried over as-is: ground values 0, 0, 3, 3 report 2.
        let rows: Vec<CrashRecord> = [0.0, 0.0, 3.0, 3.0]
            .iter()
            .map(|&g| CrashRecord {
                ground: num(g),
                ..crash("A", None)
            })
            .collect();
        assert_eq!(summary_metrics(&refs(&rows)).ground_distinct, 2);
    }

    #[test]
    fn empty_view_degrades_to_zero() {
        let rows: Vec<&CrashRecord> = Vec::new();
        assert_eq!(summary_metrics(&rows), SummaryMetrics::default());
        assert!(top_operators(&rows).is_empty());
        assert!(monthly_trend(&rows).is_empty());
        assert!(top_locations(&rows).is_empty());
        assert!(aboard_vs_fatalities(&rows).is_empty());
        assert!(mean_aboard_by_year_bin(&rows).is_empty());
        assert!(aircraft_summary(&rows).is_empty());
        assert_eq!(air_vs_ground(&rows)[1].fatalities, 0.0);
        assert!(fatalities_by_year_bin(&rows).iter().all(|b| b.value == 0.0));
    }

    #[test]
    fn year_bin_totals_include_every_label() {
        let rows = vec![
            CrashRecord {
                year_bin: Some(YearBin::Mid1950s),
                ..crash("A", Some(4.0))
            },
            CrashRecord {
                year_bin: Some(YearBin::Mid1950s),
                ..crash("B", Some(6.0))
            },
            CrashRecord {
                year_bin: Some(YearBin::Mid2020s),
                ..crash("B", Some(1.0))
            },
            crash("C", Some(100.0)),
        ];
        let bins = fatalities_by_year_bin(&refs(&rows));

        assert_eq!(bins.len(), 10);
        let order: Vec<YearBin> = bins.iter().map(|b| b.bin).collect();
        assert_eq!(order, YearBin::ALL);
        assert_eq!(bins[YearBin::Mid1950s.index()].value, 10.0);
        assert_eq!(bins[YearBin::Mid2020s.index()].value, 1.0);
        assert_eq!(bins[YearBin::Late1900s.index()].value, 0.0);
    }

    #[test]
    fn monthly_trend_is_chronological_and_skips_undated_rows() {
        let dated = |y, m, f| CrashRecord {
            date: NaiveDate::from_ymd_opt(y, m, 1),
            ..crash("A", Some(f))
        };
        let rows = vec![
            dated(1960, 5, 2.0),
            dated(1950, 1, 1.0),
            dated(1960, 5, 3.0),
            crash("A", Some(50.0)),
        ];
        let trend = monthly_trend(&refs(&rows));
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(1950, 1, 1).unwrap());
        assert_eq!(trend[1].fatalities_air, 5.0);
    }

    #[test]
    fn air_vs_ground_sums_both_columns() {
        let rows = vec![
            CrashRecord {
                ground: num(2.0),
                ..crash("A", Some(10.0))
            },
            CrashRecord {
                ground: num(1.0),
                ..crash("A", None)
            },
        ];
        let [air, ground] = air_vs_ground(&refs(&rows));
        assert_eq!(air.impact, "Air Fatalities");
        assert_eq!(air.fatalities, 10.0);
        assert_eq!(ground.impact, "Ground Fatalities");
        assert_eq!(ground.fatalities, 3.0);
    }

    #[test]
    fn top_locations_count_rows_and_skip_missing_location() {
        let at = |loc: Option<&str>| CrashRecord {
            location: loc.map(str::to_string),
            ..crash("A", None)
        };
        let rows = vec![at(Some("Moscow")), at(Some("Paris")), at(Some("Moscow")), at(None)];
        let locs = top_locations(&refs(&rows));
        assert_eq!(
            locs,
            vec![
                LocationCount { location: "Moscow".into(), crash_count: 2 },
                LocationCount { location: "Paris".into(), crash_count: 1 },
            ]
        );
    }

    #[test]
    fn scatter_excludes_rows_missing_either_value() {
        let rows = vec![
            CrashRecord {
                aboard: num(10.0),
                year: num(1970.0),
                ..crash("A", Some(3.0))
            },
            CrashRecord {
                aboard: num(10.0),
                ..crash("A", None)
            },
            crash("A", Some(4.0)),
        ];
        let points = aboard_vs_fatalities(&refs(&rows));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].year, Some(1970.0));
        assert_eq!(points[0].operator, "A");
    }

    #[test]
    fn mean_aboard_omits_empty_bins() {
        let rows = vec![
            CrashRecord {
                year_bin: Some(YearBin::Late1960s),
                aboard: num(10.0),
                ..crash("A", None)
            },
            CrashRecord {
                year_bin: Some(YearBin::Late1960s),
                aboard: num(20.0),
                ..crash("A", None)
            },
            CrashRecord {
                year_bin: Some(YearBin::Mid1930s),
                aboard: num(4.0),
                ..crash("A", None)
            },
            CrashRecord {
                year_bin: Some(YearBin::Early1980s),
                ..crash("A", None)
            },
        ];
        let means = mean_aboard_by_year_bin(&refs(&rows));
        assert_eq!(
            means,
            vec![
                BinValue { bin: YearBin::Mid1930s, value: 4.0 },
                BinValue { bin: YearBin::Late1960s, value: 15.0 },
            ]
        );
    }

    #[test]
    fn aircraft_summary_ranks_by_frequency_with_sums() {
        let plane = |name: &str, f: f64, g: f64, a: f64| CrashRecord {
            aircraft: Some(name.into()),
            ground: num(g),
            aboard: num(a),
            ..crash("A", Some(f))
        };
        let rows = vec![
            plane("DC-3", 10.0, 1.0, 20.0),
            plane("DC-3", 5.0, 0.0, 10.0),
            plane("Tu-154", 100.0, 0.0, 120.0),
            crash("A", Some(1.0)),
        ];
        let summary = aircraft_summary(&refs(&rows));
        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary[0],
            AircraftSummary {
                aircraft: "DC-3".into(),
                count: 2,
                fatalities_air: 15.0,
                ground: 1.0,
                aboard: 30.0,
            }
        );
        assert_eq!(summary[1].aircraft, "Tu-154");
    }

    #[test]
    fn seasons_follow_calendar_order_regardless_of_input() {
        let in_season = |s: Season, f: f64| CrashRecord {
            season: Some(s),
            ..crash("A", Some(f))
        };
        let rows = vec![
            in_season(Season::AutumnFall, 5.0),
            in_season(Season::Summer, 1.0),
            in_season(Season::AutumnFall, 2.0),
            crash("A", Some(9.0)),
        ];

        let counts = season_breakdown(&refs(&rows), SeasonMetric::CrashCount);
        let order: Vec<Season> = counts.iter().map(|s| s.season).collect();
        assert_eq!(order, Season::ALL);
        let values: Vec<f64> = counts.iter().map(|s| s.value).collect();
        assert_eq!(values, [0.0, 0.0, 1.0, 2.0]);

        let deaths = season_breakdown(&refs(&rows), SeasonMetric::TotalFatalities);
        assert_eq!(deaths[Season::AutumnFall.index()].value, 7.0);
    }

    #[test]
    fn snapshot_filters_charts_but_not_aircraft_or_seasons() {
        let rec = |op: &str, aircraft: &str, f: f64| CrashRecord {
            aircraft: Some(aircraft.into()),
            season: Some(Season::Winter),
            ..crash(op, Some(f))
        };
        let table = CrashTable::from_records(
            vec![rec("A", "DC-3", 1.0), rec("B", "Tu-154", 2.0)],
            columns::FILTERABLE.iter().map(|c| c.to_string()).collect(),
        );
        let mut filters = init_filter_state();
        filters.insert("operator".into(), BTreeSet::from(["A".to_string()]));

        let mut snap = DashboardSnapshot::compute(&table, &filters, SeasonMetric::CrashCount);
        assert_eq!(snap.view.indices, [0]);
        assert_eq!(snap.metrics.crashes, 1);
        assert_eq!(snap.top_operators.len(), 1);
        assert_eq!(snap.aircraft_summary.len(), 2);
        assert_eq!(snap.seasons[Season::Winter.index()].value, 2.0);
        assert_eq!(snap.fatalities_by_year_bin.len(), 10);

        snap.set_season_metric(&table, SeasonMetric::TotalFatalities);
        assert_eq!(snap.seasons[Season::Winter.index()].value, 3.0);
    }

    #[test]
    fn unfiltered_snapshot_covers_the_whole_table() {
        let table = CrashTable::from_records(
            vec![crash("A", Some(1.0)), crash("B", Some(2.0))],
            columns::FILTERABLE.iter().map(|c| c.to_string()).collect(),
        );
        let snap = DashboardSnapshot::compute(&table, &init_filter_state(), SeasonMetric::default());
        assert_eq!(snap.view.indices.len(), table.len());
        assert_eq!(snap.metrics.total_fatalities, 3.0);
    }
}
