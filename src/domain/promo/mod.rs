//! Promo code redemption domain.
//!
//! Entities, value objects, and pure calculations for the two code types
//! (bonus days and percentage discounts), plus the error taxonomy shared by
//! every redemption and consumption operation.

pub mod activation;
pub mod active_discount;
pub mod code;
pub mod errors;
pub mod payment;
pub mod pricing;
pub mod promo_code;

pub use activation::PromoCodeActivation;
pub use active_discount::ActiveDiscount;
pub use code::RedemptionCode;
pub use errors::PromoError;
pub use payment::PaymentRecord;
pub use pricing::{discounted_price, DiscountedPrice};
pub use promo_code::{NewPromoCode, PromoCode, PromoCodeType, PromoCodeUpdate};
