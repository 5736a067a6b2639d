//! Summary metrics and grouped roll-ups over a [`FilteredView`].
//!
//! Every function is pure and treats an empty view as an ordinary input:
//! sums are zero and groupings are empty. Sums that leave the range of their
//! type stop at its maximum and log a warning.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::filter::FilteredView;
use super::model::Transaction;

/// Number of products shown in the "top products" chart.
pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

/// Total sales for one category value (a product or a country).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTotal {
    pub key: String,
    pub sales: Decimal,
}

/// One cell of the year × month heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapCell {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
    pub sales: Decimal,
}

/// Total sales on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub sales: Decimal,
}

/// One point of the quantity vs. sales scatter plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterPoint {
    pub quantity: u64,
    pub sales: Decimal,
    pub country: String,
    pub price: Decimal,
    pub product_name: String,
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Add non-negative sales amounts, pinning the result at `Decimal::MAX`.
fn add_sales(total: Decimal, sales: Decimal) -> Decimal {
    if total == Decimal::MAX {
        return total;
    }
    total.checked_add(sales).unwrap_or_else(|| {
        log::warn!("Sales sum exceeds {}; capping the total", Decimal::MAX);
        Decimal::MAX
    })
}

pub fn total_sales(view: &FilteredView) -> Decimal {
    view.iter().fold(Decimal::ZERO, |acc, tx| add_sales(acc, tx.sales))
}

pub fn transaction_count(view: &FilteredView) -> usize {
    view.len()
}

pub fn total_quantity(view: &FilteredView) -> u64 {
    view.iter().fold(0u64, |acc, tx| {
        if acc == u64::MAX {
            return acc;
        }
        acc.checked_add(tx.quantity).unwrap_or_else(|| {
            log::warn!("Quantity sum exceeds {}; capping the total", u64::MAX);
            u64::MAX
        })
    })
}

// ---------------------------------------------------------------------------
// Grouped roll-ups
// ---------------------------------------------------------------------------

/// Sum sales per key, then sort descending. Keys with equal totals keep the
/// order in which they first appear in the view.
fn group_sales_desc<'v, F>(view: &FilteredView<'v>, key: F) -> Vec<GroupTotal>
where
    F: Fn(&'v Transaction) -> &'v str,
{
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for tx in view.iter() {
        let k = key(tx);
        match position.get(k) {
            Some(&ix) => groups[ix].sales = add_sales(groups[ix].sales, tx.sales),
            None => {
                position.insert(k, groups.len());
                groups.push(GroupTotal {
                    key: k.to_string(),
                    sales: tx.sales,
                });
            }
        }
    }

    // `sort_by` is stable, so first-seen order breaks ties.
    groups.sort_by(|a, b| b.sales.cmp(&a.sales));
    groups
}

/// The `n` best-selling products, highest first.
pub fn top_products_by_sales(view: &FilteredView, n: usize) -> Vec<GroupTotal> {
    let mut groups = group_sales_desc(view, |tx| tx.product_name.as_str());
    groups.truncate(n);
    groups
}

/// Sales per country, highest first.
pub fn sales_by_country(view: &FilteredView) -> Vec<GroupTotal> {
    group_sales_desc(view, |tx| tx.country.as_str())
}

/// Sales per (year, month), ordered chronologically.
pub fn seasonal_heatmap(view: &FilteredView) -> Vec<HeatmapCell> {
    let mut cells: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for tx in view.iter() {
        let cell = cells.entry((tx.date.year(), tx.date.month())).or_default();
        *cell = add_sales(*cell, tx.sales);
    }
    cells
        .into_iter()
        .map(|((year, month), sales)| HeatmapCell { year, month, sales })
        .collect()
}

/// Sales per day, ordered chronologically.
pub fn sales_over_time(view: &FilteredView) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in view.iter() {
        let day = days.entry(tx.date).or_default();
        *day = add_sales(*day, tx.sales);
    }
    days.into_iter()
        .map(|(date, sales)| DailySales { date, sales })
        .collect()
}

/// One point per record, in view order.
pub fn scatter_points(view: &FilteredView) -> Vec<ScatterPoint> {
    view.iter()
        .map(|tx| ScatterPoint {
            quantity: tx.quantity,
            sales: tx.sales,
            country: tx.country.clone(),
            price: tx.price,
            product_name: tx.product_name.clone(),
        })
        .collect()
}
