//! Promo code activation record.

use crate::domain::foundation::{ActivationId, PaymentId, PromoCodeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof that a user redeemed a code.
///
/// At most one row exists per (promo_code_id, user_id) pair, ever; the
/// storage layer enforces this with a uniqueness constraint. `payment_id`
/// may be backfilled once by the consumption protocol, but the row itself
/// is never duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCodeActivation {
    pub id: ActivationId,
    pub promo_code_id: PromoCodeId,
    pub user_id: UserId,
    pub payment_id: Option<PaymentId>,
    pub activated_at: DateTime<Utc>,
}

impl PromoCodeActivation {
    /// Whether this activation has already been attributed to a payment.
    pub fn is_linked_to_payment(&self) -> bool {
        self.payment_id.is_some()
    }
}
