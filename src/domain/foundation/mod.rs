//! Foundation types shared across the domain: identifiers and errors.

mod errors;
mod ids;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ActivationId, PaymentId, PromoCodeId, UserId};
