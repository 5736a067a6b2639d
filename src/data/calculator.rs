use rust_decimal::Decimal;

/// Predicted sales for a price and quantity, or `None` when the product does
/// not fit in a `Decimal`. Callers clamp both inputs to non-negative values.
pub fn predict(price: Decimal, quantity: u64) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}
