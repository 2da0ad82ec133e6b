//! Strongly-typed identifier value objects.
//!
//! All identifiers are `i64` newtypes: promo codes, activations and payments
//! are keyed by BIGSERIAL columns, and user ids come from the external
//! messenger platform, which hands out 64-bit integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! define_i64_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the inner value.
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_i64_id! {
    /// Unique identifier for a user of the subscription service.
    UserId
}

define_i64_id! {
    /// Unique identifier for a promo code record.
    PromoCodeId
}

define_i64_id! {
    /// Unique identifier for a payment record (external collaborator).
    PaymentId
}

define_i64_id! {
    /// Unique identifier for a promo code activation record.
    ActivationId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_value() {
        let id = PromoCodeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(PromoCodeId::from(42), id);
    }

    #[test]
    fn ids_of_different_kinds_are_distinct_types() {
        // Compile-time property; the assertion just anchors the test.
        let user = UserId::new(1);
        let payment = PaymentId::new(1);
        assert_eq!(user.value(), payment.value());
    }

    #[test]
    fn display_shows_raw_value() {
        assert_eq!(format!("{}", UserId::new(123456789)), "123456789");
    }

    #[test]
    fn parses_from_string() {
        let id: ActivationId = "77".parse().unwrap();
        assert_eq!(id.value(), 77);
        assert!("not-a-number".parse::<ActivationId>().is_err());
    }

    #[test]
    fn serializes_transparently() {
        let id = PaymentId::new(9);
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: PaymentId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
    }
}
