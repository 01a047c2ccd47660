//! Deterministic sales-tax computation.
//!
//! Tax is applied after the model response, never inside it, so the
//! arithmetic is auditable: `price * (1 + rate)` rounded half-up to two
//! decimal places for taxable items, the unchanged price otherwise.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency precision in decimal places.
const SCALE: u32 = 2;

/// Price after tax for one item.
pub fn price_with_tax(price: Decimal, taxable: bool, rate: Decimal) -> Decimal {
    if !taxable {
        return price;
    }
    (price * (Decimal::ONE + rate))
        .round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(mantissa: i64, scale: u32) -> Decimal {
        Decimal::new(mantissa, scale)
    }

    #[test]
    fn non_taxable_price_is_unchanged() {
        assert_eq!(price_with_tax(d(399, 2), false, d(8, 2)), d(399, 2));
    }

    #[test]
    fn taxable_price_rounds_half_up() {
        // 7.49 * 1.08 = 8.0892 -> 8.09
        assert_eq!(price_with_tax(d(749, 2), true, d(8, 2)), d(809, 2));
    }

    #[test]
    fn exact_midpoint_rounds_away_from_zero() {
        // 1.25 * 1.10 = 1.375 -> 1.38
        assert_eq!(price_with_tax(d(125, 2), true, d(10, 2)), d(138, 2));
    }

    #[test]
    fn zero_rate_keeps_taxable_price() {
        assert_eq!(price_with_tax(d(500, 2), true, Decimal::ZERO), d(500, 2));
    }

    #[test]
    fn whole_dollar_amounts() {
        // 9.00 * 1.08 = 9.72
        assert_eq!(price_with_tax(d(900, 2), true, d(8, 2)), d(972, 2));
    }
}
