use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Parser;
use rust_decimal::Decimal;
use serde::Serialize;

/// Writes a synthetic transactions file for trying out the dashboard.
#[derive(Debug, Parser)]
#[command(about)]
struct Cli {
    /// Output path.
    #[arg(long, default_value = "Sales Transaction v.4a.csv")]
    output: PathBuf,

    /// Number of transactions to generate.
    #[arg(long, default_value_t = 2000)]
    rows: usize,

    /// PRNG seed; the same seed always writes the same file.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const PRODUCTS: [(&str, &str, i64); 12] = [
    ("22423", "Regency Cakestand 3 Tier", 1289),
    ("85123A", "White Hanging Heart T-Light Holder", 295),
    ("47566", "Party Bunting", 495),
    ("84879", "Assorted Colour Bird Ornament", 169),
    ("20725", "Lunch Bag Red Retrospot", 165),
    ("22720", "Set Of 3 Cake Tins Pantry Design", 495),
    ("21212", "Pack Of 72 Retrospot Cake Cases", 55),
    ("23203", "Jumbo Bag Vintage Doily", 208),
    ("22086", "Paper Chain Kit 50's Christmas", 295),
    ("22197", "Popcorn Holder", 85),
    ("85099B", "Jumbo Bag Red Retrospot", 208),
    ("23084", "Rabbit Night Light", 179),
];

const COUNTRIES: [&str; 8] = [
    "United Kingdom",
    "United Kingdom",
    "United Kingdom",
    "Germany",
    "France",
    "EIRE",
    "Netherlands",
    "Australia",
];

/// One output row. Field names become the CSV header.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SampleRow {
    transaction_no: usize,
    date: String,
    product_no: &'static str,
    product_name: &'static str,
    price: Decimal,
    quantity: Option<usize>,
    customer_no: Option<usize>,
    country: &'static str,
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

    /// Uniform in `0..n`.
    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// Sales are busier towards the end of the year.
fn seasonal_day(rng: &mut SimpleRng, first: NaiveDate, span_days: i64) -> NaiveDate {
    loop {
        let day = first + Duration::days(rng.below(span_days as usize) as i64);
        let weight = match day.month() {
            9..=11 => 1.0,
            12 => 0.8,
            _ => 0.55,
        };
        if rng.next_f64() < weight {
            return day;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut rng = SimpleRng::new(cli.seed);

    let first = NaiveDate::from_ymd_opt(2018, 12, 1).context("invalid start date")?;
    let last = NaiveDate::from_ymd_opt(2019, 12, 9).context("invalid end date")?;
    let span_days = (last - first).num_days() + 1;

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;

    let mut incomplete = 0usize;
    for i in 0..cli.rows {
        let (product_no, product_name, base_cents) = *rng.pick(&PRODUCTS);
        // Up to +/-20% around the list price.
        let jitter = (rng.next_f64() * 0.4 - 0.2) * base_cents as f64;
        let price = Decimal::new(base_cents + jitter.round() as i64, 2).max(Decimal::new(1, 2));
        let quantity = 1 + rng.below(24) + if rng.next_f64() < 0.05 { 100 } else { 0 };
        let customer = 12000 + rng.below(6000);
        let date = seasonal_day(&mut rng, first, span_days);
        let country = *rng.pick(&COUNTRIES);

        // About one row in a hundred is missing its customer or quantity.
        let (customer_no, quantity) = match rng.below(200) {
            0 => (None, Some(quantity)),
            1 => (Some(customer), None),
            _ => (Some(customer), Some(quantity)),
        };
        if customer_no.is_none() || quantity.is_none() {
            incomplete += 1;
        }

        writer.serialize(SampleRow {
            transaction_no: 581000 + i,
            date: date.format("%m/%d/%Y").to_string(),
            product_no,
            product_name,
            price,
            quantity,
            customer_no,
            country,
        })?;
    }
    writer.flush()?;

    println!(
        "Wrote {} transactions ({incomplete} incomplete) to {}",
        cli.rows,
        cli.output.display()
    );
    Ok(())
}
