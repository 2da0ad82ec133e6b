//! Port for the one-active-discount-per-user store.

use crate::domain::foundation::{DomainError, PromoCodeId, UserId};
use crate::domain::promo::ActiveDiscount;
use async_trait::async_trait;

/// Outcome of granting a discount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountGrant {
    /// The user had no discount; the new one is now held.
    Granted(ActiveDiscount),
    /// The user already held a discount; the existing one is returned and
    /// nothing was written.
    AlreadyActive(ActiveDiscount),
}

/// Storage port for per-user active discounts.
///
/// `user_id` is the storage key, which is what makes "at most one active
/// discount per user" hold even under concurrent grants: `set` is a
/// conditional insert, never an upsert.
#[async_trait]
pub trait ActiveDiscountStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError>;

    /// Grants a discount unless one is already held.
    async fn set(&self, discount: ActiveDiscount) -> Result<DiscountGrant, DomainError>;

    /// Removes the user's discount. Returns the removed record, or `None`
    /// when the user held none.
    async fn clear(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError>;

    /// Removes every discount granted by one promo code (cascade-delete
    /// support). Returns how many were removed.
    async fn clear_by_promo(&self, promo_code_id: PromoCodeId) -> Result<u64, DomainError>;
}
