use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

/// Write a synthetic crash CSV with the quirks of the real export.
#[derive(Parser, Debug)]
struct Args {
    /// Output CSV file
    #[arg(default_value = "AIRPLANECRASHESPROJECT.csv")]
    output: PathBuf,

    /// Number of distinct rows before duplicates are appended
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// One source row, with the header names of the published crash dataset.
#[derive(Debug, Clone, Serialize)]
struct CrashRow {
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Quarter")]
    quarter: String,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Day")]
    day: String,
    #[serde(rename = "Country/Region")]
    country_region: String,
    #[serde(rename = "Aircraft Manufacturer")]
    aircraft_manufacturer: String,
    #[serde(rename = "Aircraft")]
    aircraft: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Operator")]
    operator: String,
    #[serde(rename = "Ground")]
    ground: String,
    #[serde(rename = "Fatalities (air)")]
    fatalities_air: String,
    #[serde(rename = "Aboard")]
    aboard: String,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const MONTHS: [&str; 12] = [
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

const FLEET: [(&str, &[&str]); 5] = [
    ("Douglas", &["Douglas DC-3", "Douglas C-47", "Douglas DC-6"]),
    ("Boeing", &["Boeing 707", "Boeing 727", "Boeing 737"]),
    ("Tupolev", &["Tupolev Tu-104", "Tupolev Tu-154"]),
    ("Lockheed", &["Lockheed Constellation", "Lockheed Electra"]),
    ("de Havilland", &["de Havilland Comet", "de Havilland Dragon Rapide"]),
];

const OPERATORS: [&str; 8] = [
    "Aeroflot",
    "Pan American World Airways",
    "KLM Royal Dutch Airlines",
    "Air France",
    "U.S. Air Force",
    "Military - Royal Air Force",
    "Deutsche Lufthansa",
    "Private",
];

const PLACES: [(&str, &[&str]); 6] = [
    ("Russia", &["Moscow", "Leningrad", "Novosibirsk"]),
    ("United States", &["New York", "Chicago", "Anchorage"]),
    ("France", &["Paris", "Nice"]),
    ("Brazil", &["Sao Paulo", "Rio de Janeiro"]),
    ("Netherlands", &["Amsterdam"]),
    ("India", &["Bombay", "New Delhi"]),
];

fn generate_row(rng: &mut SimpleRng) -> CrashRow {
    let year = 1908 + rng.below(117);
    let month_idx = rng.below(12) as usize;
    let (maker, models) = FLEET[rng.below(FLEET.len() as u64) as usize];
    let (country, cities) = PLACES[rng.below(PLACES.len() as u64) as usize];
    let aboard = 2 + rng.below(150);
    let fatalities = rng.below(aboard + 1);
    let ground = if rng.chance(0.9) { 0 } else { rng.below(40) };
    let aircraft = rng.pick(models);
    let city = rng.pick(cities);
    let operator = rng.pick(&OPERATORS);

    // Messy cells the dashboard has to cope with.
    let month = match rng.below(50) {
        0 => MONTHS[month_idx].to_lowercase(),
        1 => String::new(),
        _ => MONTHS[month_idx].to_string(),
    };
    let blank_or = |rng: &mut SimpleRng, p: f64, value: String| {
        if rng.chance(p) {
            if rng.chance(0.5) { "   ".to_string() } else { String::new() }
        } else {
            value
        }
    };

    CrashRow {
        year: year.to_string(),
        quarter: format!("Qtr {}", month_idx / 3 + 1),
        month,
        day: (1 + rng.below(28)).to_string(),
        country_region: blank_or(rng, 0.03, country.to_string()),
        aircraft_manufacturer: blank_or(rng, 0.03, maker.to_string()),
        aircraft: aircraft.to_string(),
        location: blank_or(rng, 0.05, format!("{city}, {country}")),
        operator: blank_or(rng, 0.02, operator.to_string()),
        ground: ground.to_string(),
        fatalities_air: blank_or(rng, 0.02, fatalities.to_string()),
        aboard: if rng.chance(0.02) { "?".to_string() } else { aboard.to_string() },
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output_path = args.output;

    let mut rng = SimpleRng::new(args.seed);
    let mut rows: Vec<CrashRow> = (0..args.rows).map(|_| generate_row(&mut rng)).collect();

    // A handful of exact duplicates.
    for i in (0..rows.len()).step_by(250) {
        let dup = rows[i].clone();
        rows.push(dup);
    }

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    for row in &rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {} crash records to {}", rows.len(), output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_to_the_dashboard_csv() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.output, PathBuf::from("AIRPLANECRASHESPROJECT.csv"));
        assert_eq!(args.rows, 2000);

        let args = Args::try_parse_from(["generate_sample", "out.csv", "--rows", "10"]).unwrap();
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!(args.rows, 10);
    }

    #[test]
    fn same_seed_gives_same_rows() {
        let mut a = SimpleRng::new(7);
        let mut b = SimpleRng::new(7);
        assert_eq!(generate_row(&mut a).year, generate_row(&mut b).year);
    }
}
