use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub mod dashboard;
pub mod panels;
pub mod plot;

/// `$1,234.56`
pub fn format_money(value: Decimal) -> String {
    format!("${}", format_num::format_num!(",.2f", to_f64(value)))
}

/// `1,234`
pub fn format_count(value: u64) -> String {
    format_num::format_num!(",.0f", value as f64)
}

/// Lossy conversion for plotting.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn money_has_dollar_sign_and_two_decimals() {
        assert_eq!(format_money(Decimal::from_str("60000").unwrap()), "$60,000.00");
        assert_eq!(format_money(Decimal::from_str("40").unwrap()), "$40.00");
    }

    #[test]
    fn counts_have_thousands_separators() {
        assert_eq!(format_count(1_234_567), "1,234,567");
        assert_eq!(format_count(42), "42");
    }
}
