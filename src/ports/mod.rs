//! Ports: trait boundaries between the application core and the outside
//! world. Storage adapters and external services implement these; handlers
//! depend only on the traits.

mod activation_ledger;
mod active_discount_store;
mod notification_sender;
mod payment_store;
mod promo_code_catalog;
mod subscription_extender;

pub use activation_ledger::{ActivationLedger, ActivationRecord};
pub use active_discount_store::{ActiveDiscountStore, DiscountGrant};
pub use notification_sender::NotificationSender;
pub use payment_store::PaymentStore;
pub use promo_code_catalog::{PromoCodeCatalog, UsageIncrement};
pub use subscription_extender::SubscriptionExtender;
