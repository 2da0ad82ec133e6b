//! Promo command and query handlers.

mod consume_discount;
mod create_promo_code;
mod delete_promo_code;
mod get_active_discount;
mod list_activations;
mod list_promo_codes;
mod quote_payment_discount;
mod redeem_bonus;
mod redeem_discount;
mod update_promo_code;

pub use consume_discount::{ConsumeDiscountCommand, ConsumeDiscountHandler};
pub use create_promo_code::CreatePromoCodeHandler;
pub use delete_promo_code::DeletePromoCodeHandler;
pub use get_active_discount::{ActiveDiscountView, GetActiveDiscountHandler};
pub use list_activations::{ActivationListing, ListActivationsHandler};
pub use list_promo_codes::{ListPromoCodesHandler, ListPromoCodesQuery, PromoCodeListing};
pub use quote_payment_discount::{
    PaymentQuote, QuotePaymentDiscountCommand, QuotePaymentDiscountHandler,
};
pub use redeem_bonus::{RedeemBonusCommand, RedeemBonusHandler, RedeemBonusOutcome};
pub use redeem_discount::{RedeemDiscountCommand, RedeemDiscountHandler, RedeemDiscountOutcome};
pub use update_promo_code::UpdatePromoCodeHandler;
