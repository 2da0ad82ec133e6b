//! Port for promo code persistence.

use crate::domain::foundation::{DomainError, PromoCodeId};
use crate::domain::promo::{NewPromoCode, PromoCode, PromoCodeType, PromoCodeUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Outcome of a conditional usage-counter increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageIncrement {
    /// The counter moved up by one.
    Updated,
    /// The code exists but `current_activations` already equals
    /// `max_activations` and overflow was not allowed.
    CapReached,
    /// No code with this id.
    NotFound,
}

/// Storage port for the promo code catalog.
///
/// `increment_usage` must be atomic with respect to concurrent callers: the
/// capacity check and the counter bump happen in one storage operation, so
/// two racing redemptions can never both claim the last slot.
#[async_trait]
pub trait PromoCodeCatalog: Send + Sync {
    /// Persists a new promo code and returns it with its assigned id.
    ///
    /// Fails with `DuplicatePromoCode` when the code string is taken.
    async fn create(&self, input: NewPromoCode) -> Result<PromoCode, DomainError>;

    async fn find_by_id(&self, id: PromoCodeId) -> Result<Option<PromoCode>, DomainError>;

    /// Case-insensitive lookup by code string, regardless of eligibility.
    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError>;

    /// Looks up a code of the given type that is active, unexpired as of
    /// `now`, and still has capacity. Returns `None` for every other case,
    /// including codes that exist but fail one of the checks.
    async fn find_eligible(
        &self,
        code: &str,
        promo_type: PromoCodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<PromoCode>, DomainError>;

    /// A page of codes with the active flag set, newest first.
    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError>;

    /// A page of every code including inactive and expired ones, newest first.
    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError>;

    async fn count(&self) -> Result<i64, DomainError>;

    /// Applies a partial update. Returns the updated record, or `None` when
    /// the code does not exist.
    async fn update(
        &self,
        id: PromoCodeId,
        update: PromoCodeUpdate,
    ) -> Result<Option<PromoCode>, DomainError>;

    /// Deletes a code and everything hanging off it: active discounts
    /// referencing it are cleared, payments referencing it keep their row but
    /// lose the reference, and its activation history is removed. Returns
    /// `false` when the code does not exist.
    async fn delete(&self, id: PromoCodeId) -> Result<bool, DomainError>;

    /// Bumps `current_activations` by one. With `allow_overflow` false the
    /// increment only happens while the counter is below the cap; with it
    /// true the counter moves unconditionally, which is how late discount
    /// consumption is recorded even after the cap filled up.
    async fn increment_usage(
        &self,
        id: PromoCodeId,
        allow_overflow: bool,
    ) -> Result<UsageIncrement, DomainError>;

    /// Moves the counter back down by one, not below zero. Returns `false`
    /// when the code does not exist or the counter was already zero.
    async fn decrement_usage(&self, id: PromoCodeId) -> Result<bool, DomainError>;
}
