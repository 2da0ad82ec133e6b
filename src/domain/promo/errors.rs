//! Promo-specific error taxonomy.
//!
//! Expected rejections (unknown/expired/exhausted code, already used, user
//! already holds a discount) are regular outcomes of a redemption attempt:
//! callers match on them and render a message, they are never fatal. Only
//! `Infrastructure` signals a storage problem the caller may retry.

use crate::domain::foundation::{
    DomainError, ErrorCode, PaymentId, PromoCodeId, UserId, ValidationError,
};

/// Errors surfaced by the redemption and consumption operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PromoError {
    /// No eligible code with this string: unknown, wrong type, inactive,
    /// expired, or exhausted. Deliberately indistinguishable to the caller.
    CodeNotFound { code: String },

    /// This user has already redeemed this code.
    AlreadyUsed { code: String },

    /// The user already holds an active discount; carries its identity so
    /// the caller can display it.
    DiscountAlreadyActive {
        code: Option<String>,
        percentage: i32,
    },

    /// A promo code with this code string already exists.
    DuplicateCode(String),

    /// No promo code with this id.
    PromoNotFound(PromoCodeId),

    /// The referenced payment does not exist.
    PaymentNotFound(PaymentId),

    /// The external subscription extension call failed.
    ExtensionFailed { user_id: UserId, reason: String },

    /// A write sequence partially succeeded; bookkeeping is inconsistent
    /// and needs manual reconciliation.
    IntegrityAnomaly { detail: String },

    /// Input validation failed.
    Validation { field: String, message: String },

    /// Storage or other infrastructure failure.
    Infrastructure(String),
}

impl PromoError {
    pub fn code_not_found(code: impl Into<String>) -> Self {
        PromoError::CodeNotFound { code: code.into() }
    }

    pub fn already_used(code: impl Into<String>) -> Self {
        PromoError::AlreadyUsed { code: code.into() }
    }

    pub fn discount_already_active(code: Option<String>, percentage: i32) -> Self {
        PromoError::DiscountAlreadyActive { code, percentage }
    }

    pub fn duplicate_code(code: impl Into<String>) -> Self {
        PromoError::DuplicateCode(code.into())
    }

    pub fn promo_not_found(id: PromoCodeId) -> Self {
        PromoError::PromoNotFound(id)
    }

    pub fn payment_not_found(id: PaymentId) -> Self {
        PromoError::PaymentNotFound(id)
    }

    pub fn extension_failed(user_id: UserId, reason: impl Into<String>) -> Self {
        PromoError::ExtensionFailed {
            user_id,
            reason: reason.into(),
        }
    }

    pub fn integrity_anomaly(detail: impl Into<String>) -> Self {
        PromoError::IntegrityAnomaly {
            detail: detail.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PromoError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PromoError::Infrastructure(message.into())
    }

    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            PromoError::CodeNotFound { .. } => ErrorCode::PromoCodeNotFound,
            PromoError::AlreadyUsed { .. } => ErrorCode::PromoCodeAlreadyUsed,
            PromoError::DiscountAlreadyActive { .. } => ErrorCode::DiscountAlreadyActive,
            PromoError::DuplicateCode(_) => ErrorCode::DuplicatePromoCode,
            PromoError::PromoNotFound(_) => ErrorCode::PromoCodeNotFound,
            PromoError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            PromoError::ExtensionFailed { .. } => ErrorCode::SubscriptionExtensionFailed,
            PromoError::IntegrityAnomaly { .. } => ErrorCode::IntegrityAnomaly,
            PromoError::Validation { .. } => ErrorCode::ValidationFailed,
            PromoError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing message.
    pub fn message(&self) -> String {
        match self {
            PromoError::CodeNotFound { code } => {
                format!("Promo code '{}' was not found or is no longer available", code)
            }
            PromoError::AlreadyUsed { code } => {
                format!("Promo code '{}' has already been used by this user", code)
            }
            PromoError::DiscountAlreadyActive { code, percentage } => match code {
                Some(code) => format!(
                    "A {}% discount from code '{}' is already active",
                    percentage, code
                ),
                None => format!("A {}% discount is already active", percentage),
            },
            PromoError::DuplicateCode(code) => {
                format!("A promo code '{}' already exists", code)
            }
            PromoError::PromoNotFound(id) => format!("Promo code {} does not exist", id),
            PromoError::PaymentNotFound(id) => format!("Payment {} does not exist", id),
            PromoError::ExtensionFailed { user_id, reason } => {
                format!("Failed to extend subscription for user {}: {}", user_id, reason)
            }
            PromoError::IntegrityAnomaly { detail } => {
                format!("Promo bookkeeping is inconsistent: {}", detail)
            }
            PromoError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PromoError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Whether retrying the whole call can help. Expected rejections are
    /// deterministic; only external/infrastructure failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PromoError::Infrastructure(_) | PromoError::ExtensionFailed { .. }
        )
    }
}

impl std::fmt::Display for PromoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PromoError {}

impl From<DomainError> for PromoError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => PromoError::Validation {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::DuplicatePromoCode => PromoError::DuplicateCode(
                err.details
                    .get("code")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
            ErrorCode::IntegrityAnomaly => PromoError::IntegrityAnomaly {
                detail: err.message,
            },
            _ => PromoError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for PromoError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::MissingForType { field, .. }
            | ValidationError::ForbiddenForType { field, .. } => field.clone(),
        };
        PromoError::Validation {
            field,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_not_found_carries_the_code() {
        let err = PromoError::code_not_found("GONE");
        assert!(matches!(err, PromoError::CodeNotFound { ref code } if code == "GONE"));
        assert_eq!(err.code(), ErrorCode::PromoCodeNotFound);
        assert!(err.message().contains("GONE"));
    }

    #[test]
    fn discount_already_active_carries_identity() {
        let err = PromoError::discount_already_active(Some("SAVE20".to_string()), 20);
        let msg = err.message();
        assert!(msg.contains("SAVE20"));
        assert!(msg.contains("20%"));
        assert_eq!(err.code(), ErrorCode::DiscountAlreadyActive);
    }

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(PromoError::infrastructure("connection reset").is_retryable());
        assert!(PromoError::extension_failed(UserId::new(1), "timeout").is_retryable());
    }

    #[test]
    fn expected_rejections_are_not_retryable() {
        assert!(!PromoError::code_not_found("X").is_retryable());
        assert!(!PromoError::already_used("X").is_retryable());
        assert!(!PromoError::discount_already_active(None, 10).is_retryable());
        assert!(!PromoError::integrity_anomaly("counter stuck").is_retryable());
    }

    #[test]
    fn domain_database_error_maps_to_infrastructure() {
        let err: PromoError = DomainError::database("pool exhausted").into();
        assert!(matches!(err, PromoError::Infrastructure(_)));
    }

    #[test]
    fn domain_validation_error_maps_to_validation() {
        let err: PromoError = DomainError::validation("code", "cannot be empty").into();
        assert!(matches!(
            err,
            PromoError::Validation { ref field, .. } if field == "code"
        ));
    }

    #[test]
    fn validation_error_conversion_keeps_field() {
        let err: PromoError = ValidationError::out_of_range("discount_percentage", 1, 100, 0).into();
        assert!(matches!(
            err,
            PromoError::Validation { ref field, .. } if field == "discount_percentage"
        ));
    }

    #[test]
    fn display_matches_message() {
        let err = PromoError::already_used("WELCOME30");
        assert_eq!(format!("{}", err), err.message());
    }
}
