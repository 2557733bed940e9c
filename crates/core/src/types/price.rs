//! Price formatting.
//!
//! Costs and wallet balances arrive from the API as plain JSON numbers
//! with no currency attached; QKart prices everything in dollars.

use rust_decimal::Decimal;

/// Format an amount for display, e.g. `$19.99`.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_amount() {
        assert_eq!(format_price(Decimal::new(200, 0)), "$200.00");
    }

    #[test]
    fn test_format_rounds_to_cents() {
        assert_eq!(format_price(Decimal::new(19_999, 3)), "$20.00");
        assert_eq!(format_price(Decimal::new(1_995, 2)), "$19.95");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
    }
}
