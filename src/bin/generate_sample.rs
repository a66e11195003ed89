//! Writes a synthetic countries-aggregated CSV for offline use:
//! `cargo run --bin generate_sample -- --output sample_data.csv`

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic countries-aggregated CSV")]
struct Args {
    #[arg(long, default_value = "sample_data.csv")]
    output: PathBuf,

    /// Number of days per country.
    #[arg(long, default_value_t = 400)]
    days: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Logistic cumulative curve.
fn logistic(t: f64, capacity: f64, rate: f64, midpoint: f64) -> f64 {
    capacity / (1.0 + (-rate * (t - midpoint)).exp())
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// (country, final size, growth rate, midpoint day, case fatality ratio)
const COUNTRIES: [(&str, f64, f64, f64, f64); 6] = [
    ("Atlantis", 2_500_000.0, 0.045, 160.0, 0.015),
    ("Borduria", 900_000.0, 0.060, 120.0, 0.022),
    ("Elbonia", 4_000_000.0, 0.035, 220.0, 0.010),
    ("Freedonia", 300_000.0, 0.080, 90.0, 0.030),
    ("Genovia", 60_000.0, 0.050, 200.0, 0.008),
    ("Syldavia", 1_200_000.0, 0.040, 250.0, 0.018),
];

/// Recoveries trail confirmations by this many days.
const RECOVERY_LAG: usize = 14;

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let start = NaiveDate::from_ymd_opt(2020, 1, 22).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    writer.write_record(["Date", "Country", "Confirmed", "Recovered", "Deaths"])?;

    // The real table is ordered by date, then country.
    let days = args.days as usize;
    let mut series: Vec<Vec<(i64, i64, i64)>> = Vec::new();
    for &(_, capacity, rate, midpoint, cfr) in &COUNTRIES {
        let mut confirmed = 0i64;
        let mut rows: Vec<(i64, i64, i64)> = Vec::with_capacity(days);
        for day in 0..days {
            let expected = logistic(day as f64, capacity, rate, midpoint);
            let target = (expected * rng.gauss(1.0, 0.02)).max(0.0) as i64;
            // Cumulative counts never decrease.
            confirmed = confirmed.max(target);
            let deaths = (confirmed as f64 * cfr) as i64;
            let recovered = day
                .checked_sub(RECOVERY_LAG)
                .map(|lagged| (rows[lagged].0 as f64 * 0.95) as i64)
                .unwrap_or(0)
                .min(confirmed - deaths);
            rows.push((confirmed, recovered, deaths));
        }
        series.push(rows);
    }

    for day in 0..days {
        let date = start + chrono::Duration::days(day as i64);
        for (c, (name, ..)) in COUNTRIES.iter().enumerate() {
            let (confirmed, recovered, deaths) = series[c][day];
            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                name.to_string(),
                confirmed.to_string(),
                recovered.to_string(),
                deaths.to_string(),
            ])?;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} days for {} countries to {}",
        days,
        COUNTRIES.len(),
        args.output.display()
    );
    Ok(())
}
