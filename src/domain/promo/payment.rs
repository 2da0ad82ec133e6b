//! Payment read model.
//!
//! Payments belong to the payment gateway layer; this engine only reads the
//! fields the consumption protocol needs to decide whether a discount has to
//! be reconciled, and nulls `promo_code_id` during cascade deletes.

use crate::domain::foundation::{PaymentId, PromoCodeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payment as seen by the discount consumption protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub user_id: UserId,
    /// Amount actually charged, after any discount.
    pub amount: f64,
    /// Set by the payment layer when a discount was applied at charge time.
    pub discount_applied: bool,
    /// The promo code whose discount was applied, if any.
    pub promo_code_id: Option<PromoCodeId>,
    pub created_at: DateTime<Utc>,
}
