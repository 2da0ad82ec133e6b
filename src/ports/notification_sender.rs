//! Port for user-facing notifications.

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::promo::PromoCode;
use async_trait::async_trait;

/// Sends a message telling the user their code was applied.
///
/// Notification is best-effort everywhere it is used: a delivery failure is
/// logged and swallowed, never allowed to fail a redemption that already
/// committed.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify_promo_activation(
        &self,
        user_id: UserId,
        promo: &PromoCode,
    ) -> Result<(), DomainError>;
}
