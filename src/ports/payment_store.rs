//! Read port into the payment gateway's records.

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::promo::PaymentRecord;
use async_trait::async_trait;

/// Read-only view of payments owned by the billing layer. The engine never
/// writes payments; it only inspects them during discount consumption.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentRecord>, DomainError>;
}
