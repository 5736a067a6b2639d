//! Shared fixtures for the data layer tests.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::model::{Dataset, Transaction};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// The two-record example: Widget sold in the US and Gadget sold in the UK.
pub(crate) fn two_row_dataset() -> Dataset {
    Dataset::from_transactions(vec![
        Transaction::new(date(2023, 1, 1), dec("10"), 2, "US", "Widget"),
        Transaction::new(date(2023, 2, 1), dec("5"), 4, "UK", "Gadget"),
    ])
}

/// Ten records over two calendar years. "Mug", "Lamp" and "Clock" tie at
/// 90.00 total sales; "Card" leads with 110.00.
pub(crate) fn shop_dataset() -> Dataset {
    Dataset::from_transactions(vec![
        Transaction::new(date(2022, 12, 5), dec("4.50"), 10, "UK", "Mug"),
        Transaction::new(date(2022, 12, 20), dec("15.00"), 3, "France", "Lamp"),
        Transaction::new(date(2023, 1, 3), dec("2.00"), 25, "UK", "Card"),
        Transaction::new(date(2023, 1, 3), dec("30.00"), 1, "Germany", "Clock"),
        Transaction::new(date(2023, 1, 17), dec("4.50"), 10, "UK", "Mug"),
        Transaction::new(date(2023, 2, 1), dec("15.00"), 3, "UK", "Lamp"),
        Transaction::new(date(2023, 2, 14), dec("2.00"), 5, "France", "Card"),
        Transaction::new(date(2023, 3, 9), dec("12.00"), 2, "Germany", "Vase"),
        Transaction::new(date(2023, 3, 9), dec("30.00"), 2, "UK", "Clock"),
        Transaction::new(date(2023, 3, 30), dec("1.25"), 40, "Norway", "Card"),
    ])
}
