//! Discounted price calculation.
//!
//! Pure arithmetic, no storage access. Amounts are rounded to 2 decimal
//! places using round-half-away-from-zero (`f64::round` semantics) so that
//! results are reproducible across reimplementations.

use serde::{Deserialize, Serialize};

/// Result of applying a percentage discount to a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountedPrice {
    /// Price the customer actually pays.
    pub final_price: f64,
    /// Amount taken off the original price.
    pub discount_amount: f64,
}

/// Computes the discounted price and discount amount for a percentage off.
///
/// `discount_amount = round2(original * percentage / 100)` and
/// `final_price = round2(original - discount_amount)`. If the final price
/// would go negative (only possible with a percentage above 100, which the
/// [1,100] invariant forbids upstream), it is clamped to zero and the whole
/// original price is reported as the discount.
pub fn discounted_price(original_price: f64, discount_percentage: i32) -> DiscountedPrice {
    let discount_amount = round2(original_price * (discount_percentage as f64 / 100.0));
    let final_price = round2(original_price - discount_amount);

    if final_price < 0.0 {
        return DiscountedPrice {
            final_price: 0.0,
            discount_amount: original_price,
        };
    }

    DiscountedPrice {
        final_price,
        discount_amount,
    }
}

/// Rounds to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ten_percent_off_one_hundred() {
        let price = discounted_price(100.0, 10);
        assert_eq!(price.final_price, 90.0);
        assert_eq!(price.discount_amount, 10.0);
    }

    #[test]
    fn full_discount_floors_at_zero() {
        let price = discounted_price(10.0, 100);
        assert_eq!(price.final_price, 0.0);
        assert_eq!(price.discount_amount, 10.0);
    }

    #[test]
    fn fractional_amounts_round_to_two_decimals() {
        // 33% of 9.99 = 3.2967 -> 3.30
        let price = discounted_price(9.99, 33);
        assert_eq!(price.discount_amount, 3.3);
        assert_eq!(price.final_price, 6.69);
    }

    #[test]
    fn half_cent_rounds_away_from_zero() {
        // 25% of 0.50 = 0.125 -> 0.13
        let price = discounted_price(0.5, 25);
        assert_eq!(price.discount_amount, 0.13);
        assert_eq!(price.final_price, 0.37);
    }

    #[test]
    fn defensive_clamp_covers_over_hundred_percent() {
        // Cannot happen through validated codes; the floor still holds.
        let price = discounted_price(50.0, 150);
        assert_eq!(price.final_price, 0.0);
        assert_eq!(price.discount_amount, 50.0);
    }

    #[test]
    fn one_percent_of_small_price() {
        let price = discounted_price(1.0, 1);
        assert_eq!(price.discount_amount, 0.01);
        assert_eq!(price.final_price, 0.99);
    }

    proptest! {
        #[test]
        fn final_price_is_never_negative(
            original in 0.0f64..100_000.0,
            pct in 1i32..=100,
        ) {
            let price = discounted_price(original, pct);
            prop_assert!(price.final_price >= 0.0);
            prop_assert!(price.discount_amount >= 0.0);
        }

        #[test]
        fn final_price_never_exceeds_original(
            original in 0.0f64..100_000.0,
            pct in 1i32..=100,
        ) {
            let price = discounted_price(original, pct);
            prop_assert!(price.final_price <= original + 1e-9);
        }

        #[test]
        fn parts_sum_back_to_original(
            original in 0.0f64..100_000.0,
            pct in 1i32..=100,
        ) {
            let price = discounted_price(original, pct);
            let total = price.final_price + price.discount_amount;
            prop_assert!((total - original).abs() < 0.01 + 1e-9);
        }
    }
}
