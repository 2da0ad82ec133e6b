//! Port to the subscription system.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Extends a user's subscription end date.
///
/// Implemented by the subscription service; the promo engine calls it when a
/// bonus-days code is redeemed and treats failure as grounds to roll the
/// redemption back before any bookkeeping is written.
#[async_trait]
pub trait SubscriptionExtender: Send + Sync {
    /// Adds `days` to the user's subscription and returns the new end date.
    /// `reason` is a short audit tag such as the redeemed code string.
    async fn extend(
        &self,
        user_id: UserId,
        days: i32,
        reason: &str,
    ) -> Result<DateTime<Utc>, DomainError>;
}
