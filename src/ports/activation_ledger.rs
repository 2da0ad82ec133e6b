//! Port for the append-only activation ledger.

use crate::domain::foundation::{DomainError, PaymentId, PromoCodeId, UserId};
use crate::domain::promo::PromoCodeActivation;
use async_trait::async_trait;

/// Outcome of recording an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationRecord {
    /// A new row was written.
    Recorded(PromoCodeActivation),
    /// A row for this (promo, user) pair already existed; it is returned
    /// unchanged. The ledger never duplicates the pair.
    AlreadyRecorded(PromoCodeActivation),
}

impl ActivationRecord {
    pub fn activation(&self) -> &PromoCodeActivation {
        match self {
            ActivationRecord::Recorded(a) | ActivationRecord::AlreadyRecorded(a) => a,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ActivationRecord::Recorded(_))
    }
}

/// Storage port for activation rows.
///
/// The (promo_code_id, user_id) pair is unique for all time; `record` is
/// idempotent against concurrent duplicates rather than failing on them.
#[async_trait]
pub trait ActivationLedger: Send + Sync {
    /// The activation for this (promo, user) pair, if one exists.
    async fn find(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
    ) -> Result<Option<PromoCodeActivation>, DomainError>;

    /// Writes the activation row, optionally with a payment already
    /// attached, or returns the existing one when the pair was already
    /// recorded.
    async fn record(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: Option<PaymentId>,
    ) -> Result<ActivationRecord, DomainError>;

    /// Links the (promo, user) activation to the payment that spent its
    /// discount. Only succeeds while the activation has no payment yet;
    /// returns `false` when the activation is missing or already linked.
    async fn attach_payment(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: PaymentId,
    ) -> Result<bool, DomainError>;

    /// All activations of one promo code, newest first.
    async fn list_for_promo(
        &self,
        promo_code_id: PromoCodeId,
    ) -> Result<Vec<PromoCodeActivation>, DomainError>;

    async fn count_for_promo(&self, promo_code_id: PromoCodeId) -> Result<i64, DomainError>;
}
