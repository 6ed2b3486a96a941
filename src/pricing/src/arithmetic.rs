//! Decimal-safe helpers. `rust_decimal::Decimal` already guarantees exact
//! base-10 arithmetic; these just centralise the couple of operations the
//! cost controller repeats (§9 "Floating-point money": never `f64`, and
//! percent-used only ever converts to float at the alert-threshold
//! comparison, never inside a breakdown).

use rtc_types::Money;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `cost * (1 - discount_percent / 100)`. `discount_percent` is `[0, 100]`.
pub fn apply_discount(cost: Money, discount_percent: f64) -> Money {
    let discount_fraction = Decimal::try_from(discount_percent / 100.0).unwrap_or(Decimal::ZERO);
    cost * (Decimal::ONE - discount_fraction)
}

/// Fraction of `limit` that `spent` represents, as an `f64` purely for
/// threshold comparisons and alert payloads — never fed back into a
/// monetary total.
pub fn percent_used(spent: Money, limit: Money) -> f64 {
    if limit.is_zero() {
        return 0.0;
    }
    (spent / limit).to_f64().unwrap_or(0.0)
}

/// Round to cents for display purposes only. Ledger and breakdown totals
/// must never be rounded before being summed.
pub fn round_display(amount: Money) -> Money {
    amount.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_of_zero_is_identity() {
        let cost = Money::new(1000, 2);
        assert_eq!(apply_discount(cost, 0.0), cost);
    }

    #[test]
    fn discount_of_100_percent_zeroes_cost() {
        let cost = Money::new(1000, 2);
        assert_eq!(apply_discount(cost, 100.0), Money::ZERO);
    }

    #[test]
    fn percent_used_is_order_independent_of_scale() {
        let spent = Money::new(50, 0);
        let limit = Money::new(100, 0);
        assert_eq!(percent_used(spent, limit), 0.5);
    }
}
