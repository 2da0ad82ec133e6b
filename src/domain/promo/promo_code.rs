//! Promo code entity and its input structs.
//!
//! A promo code grants either extra subscription days (`BonusDays`) or a
//! percentage price discount (`Discount`). Eligibility for redemption is a
//! conjunction of the active flag, remaining activation capacity, and the
//! optional expiry timestamp.

use crate::domain::foundation::{PromoCodeId, ValidationError};
use crate::domain::promo::RedemptionCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The effect a promo code grants on redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoCodeType {
    /// Extends the user's subscription end date by a fixed number of days.
    BonusDays,
    /// Grants a percentage price reduction, held until spent on a payment.
    Discount,
}

impl PromoCodeType {
    /// Storage representation of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromoCodeType::BonusDays => "bonus_days",
            PromoCodeType::Discount => "discount",
        }
    }

    /// Parses the storage representation.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "bonus_days" => Ok(PromoCodeType::BonusDays),
            "discount" => Ok(PromoCodeType::Discount),
            other => Err(ValidationError::invalid_format(
                "promo_type",
                format!("expected 'bonus_days' or 'discount', got '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for PromoCodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A redeemable promotional code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: PromoCodeId,
    /// Unique code string, always stored uppercase.
    pub code: String,
    pub promo_type: PromoCodeType,
    /// Days granted on redemption; present iff `promo_type == BonusDays`.
    pub bonus_days: Option<i32>,
    /// Percentage off in [1, 100]; present iff `promo_type == Discount`.
    pub discount_percentage: Option<i32>,
    pub max_activations: i32,
    pub current_activations: i32,
    /// Administrative toggle, independent of the usage counter.
    pub is_active: bool,
    /// Absent means the code never expires.
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    /// Whether `valid_until` has passed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.valid_until, Some(until) if until <= now)
    }

    /// Whether the strict redemption path still has a slot.
    pub fn has_capacity(&self) -> bool {
        self.current_activations < self.max_activations
    }

    /// The "active + eligible" filter used by redemption lookups.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.has_capacity() && !self.is_expired(now)
    }

    /// Remaining activation slots; zero once the cap is reached. The overflow
    /// consumption path can drive the counter past the cap, hence saturating.
    pub fn remaining_activations(&self) -> i32 {
        (self.max_activations - self.current_activations).max(0)
    }
}

/// Input for creating a promo code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPromoCode {
    pub code: String,
    pub promo_type: PromoCodeType,
    pub bonus_days: Option<i32>,
    pub discount_percentage: Option<i32>,
    pub max_activations: i32,
    pub is_active: bool,
    pub valid_until: Option<DateTime<Utc>>,
}

impl NewPromoCode {
    /// Validates field combinations and normalizes the code to uppercase.
    ///
    /// # Errors
    ///
    /// - empty code
    /// - `bonus_days` missing/non-positive for `BonusDays`, or set for `Discount`
    /// - `discount_percentage` missing/outside [1,100] for `Discount`, or set
    ///   for `BonusDays`
    /// - non-positive `max_activations`
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.code = RedemptionCode::try_new(&self.code)?.as_str().to_string();

        match self.promo_type {
            PromoCodeType::BonusDays => {
                let days = self
                    .bonus_days
                    .ok_or_else(|| ValidationError::missing_for_type("bonus_days", "bonus_days"))?;
                if days <= 0 {
                    return Err(ValidationError::out_of_range(
                        "bonus_days",
                        1,
                        i32::MAX as i64,
                        days as i64,
                    ));
                }
                if self.discount_percentage.is_some() {
                    return Err(ValidationError::forbidden_for_type(
                        "discount_percentage",
                        "bonus_days",
                    ));
                }
            }
            PromoCodeType::Discount => {
                let pct = self.discount_percentage.ok_or_else(|| {
                    ValidationError::missing_for_type("discount_percentage", "discount")
                })?;
                if !(1..=100).contains(&pct) {
                    return Err(ValidationError::out_of_range(
                        "discount_percentage",
                        1,
                        100,
                        pct as i64,
                    ));
                }
                if self.bonus_days.is_some() {
                    return Err(ValidationError::forbidden_for_type("bonus_days", "discount"));
                }
            }
        }

        if self.max_activations <= 0 {
            return Err(ValidationError::out_of_range(
                "max_activations",
                1,
                i32::MAX as i64,
                self.max_activations as i64,
            ));
        }

        Ok(self)
    }
}

/// Partial update for a promo code; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromoCodeUpdate {
    pub bonus_days: Option<i32>,
    pub discount_percentage: Option<i32>,
    pub max_activations: Option<i32>,
    pub is_active: Option<bool>,
    /// `Some(None)` clears the expiry; `None` leaves it untouched.
    pub valid_until: Option<Option<DateTime<Utc>>>,
}

impl PromoCodeUpdate {
    /// Validates the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(days) = self.bonus_days {
            if days <= 0 {
                return Err(ValidationError::out_of_range(
                    "bonus_days",
                    1,
                    i32::MAX as i64,
                    days as i64,
                ));
            }
        }
        if let Some(pct) = self.discount_percentage {
            if !(1..=100).contains(&pct) {
                return Err(ValidationError::out_of_range(
                    "discount_percentage",
                    1,
                    100,
                    pct as i64,
                ));
            }
        }
        if let Some(max) = self.max_activations {
            if max <= 0 {
                return Err(ValidationError::out_of_range(
                    "max_activations",
                    1,
                    i32::MAX as i64,
                    max as i64,
                ));
            }
        }
        Ok(())
    }

    /// Applies the present fields to an existing record.
    pub fn apply_to(&self, promo: &mut PromoCode) {
        if let Some(days) = self.bonus_days {
            promo.bonus_days = Some(days);
        }
        if let Some(pct) = self.discount_percentage {
            promo.discount_percentage = Some(pct);
        }
        if let Some(max) = self.max_activations {
            promo.max_activations = max;
        }
        if let Some(active) = self.is_active {
            promo.is_active = active;
        }
        if let Some(valid_until) = self.valid_until {
            promo.valid_until = valid_until;
        }
    }
}
