//! Active discount record.

use crate::domain::foundation::{PromoCodeId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single currently-active discount held by a user.
///
/// `discount_percentage` is a snapshot taken at activation time; later edits
/// to the promo code do not change an already-granted discount. At most one
/// row exists per user (user_id is the storage key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveDiscount {
    pub user_id: UserId,
    pub promo_code_id: PromoCodeId,
    pub discount_percentage: i32,
    pub activated_at: DateTime<Utc>,
}
