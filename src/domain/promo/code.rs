//! Redemption code input value object.
//!
//! Every lookup and write in the engine compares codes case-insensitively by
//! normalizing to uppercase. This type is the single place where raw user
//! input (bot message text, admin form field) becomes a comparable code.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};

/// A normalized promo code string: trimmed, uppercased, non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedemptionCode(String);

impl RedemptionCode {
    /// Normalizes raw input into a comparable code.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if the input is empty or
    /// whitespace-only.
    pub fn try_new(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for RedemptionCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_input_normalizes_to_uppercase() {
        let code = RedemptionCode::try_new("summer2026").unwrap();
        assert_eq!(code.as_str(), "SUMMER2026");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let code = RedemptionCode::try_new("  WELCOME10 \n").unwrap();
        assert_eq!(code.as_str(), "WELCOME10");
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(
            RedemptionCode::try_new(""),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn whitespace_only_input_returns_error() {
        assert!(RedemptionCode::try_new("   \t").is_err());
    }

    #[test]
    fn normalized_codes_compare_equal() {
        let a = RedemptionCode::try_new("bonus30").unwrap();
        let b = RedemptionCode::try_new(" BONUS30 ").unwrap();
        assert_eq!(a, b);
    }
}
