//! RedeemDiscountHandler - Command handler for redeeming discount promo codes.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::promo::{
    ActiveDiscount, PromoCode, PromoCodeType, PromoError, RedemptionCode,
};
use crate::ports::{
    ActivationLedger, ActiveDiscountStore, DiscountGrant, NotificationSender, PromoCodeCatalog,
};
use chrono::Utc;

/// Command to redeem a discount promo code for a user.
#[derive(Debug, Clone)]
pub struct RedeemDiscountCommand {
    pub user_id: UserId,
    pub code: String,
}

/// Result of a successful discount grant.
#[derive(Debug, Clone)]
pub struct RedeemDiscountOutcome {
    pub promo: PromoCode,
    pub discount: ActiveDiscount,
}

/// Handler for discount redemptions.
///
/// Granting writes only the active-discount row; the activation record and
/// the usage slot are claimed later, when a payment actually consumes the
/// discount. A user holding an unconsumed discount cannot stack another.
pub struct RedeemDiscountHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    ledger: Arc<dyn ActivationLedger>,
    discounts: Arc<dyn ActiveDiscountStore>,
    notifier: Arc<dyn NotificationSender>,
}

impl RedeemDiscountHandler {
    pub fn new(
        catalog: Arc<dyn PromoCodeCatalog>,
        ledger: Arc<dyn ActivationLedger>,
        discounts: Arc<dyn ActiveDiscountStore>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            discounts,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: RedeemDiscountCommand,
    ) -> Result<RedeemDiscountOutcome, PromoError> {
        // 1. Normalize the code string
        let code = RedemptionCode::try_new(&cmd.code)?;

        // 2. An existing discount blocks a new grant. A discount pointing at
        //    a deleted promo code is an orphan: drop it and carry on.
        if let Some(existing) = self.discounts.get(cmd.user_id).await? {
            match self.catalog.find_by_id(existing.promo_code_id).await? {
                Some(promo) => {
                    return Err(PromoError::discount_already_active(
                        Some(promo.code),
                        existing.discount_percentage,
                    ));
                }
                None => {
                    tracing::warn!(
                        user_id = %cmd.user_id,
                        promo_code_id = %existing.promo_code_id,
                        "Clearing orphaned discount for deleted promo code"
                    );
                    self.discounts.clear(cmd.user_id).await?;
                }
            }
        }

        // 3. Eligible discount code lookup
        let promo = self
            .catalog
            .find_eligible(code.as_str(), PromoCodeType::Discount, Utc::now())
            .await?
            .ok_or_else(|| PromoError::code_not_found(code.as_str()))?;

        let percentage = promo
            .discount_percentage
            .ok_or_else(|| PromoError::integrity_anomaly(format!(
                "discount promo {} has no discount_percentage value",
                promo.id
            )))?;

        // 4. A code whose discount was already consumed cannot be granted to
        //    the same user again.
        if self.ledger.find(promo.id, cmd.user_id).await?.is_some() {
            return Err(PromoError::already_used(code.as_str()));
        }

        // 5. Conditional insert; a racing grant loses here.
        let discount = match self
            .discounts
            .set(ActiveDiscount {
                user_id: cmd.user_id,
                promo_code_id: promo.id,
                discount_percentage: percentage,
                activated_at: Utc::now(),
            })
            .await?
        {
            DiscountGrant::Granted(discount) => discount,
            DiscountGrant::AlreadyActive(existing) => {
                return Err(PromoError::discount_already_active(
                    None,
                    existing.discount_percentage,
                ));
            }
        };

        // 6. Notify, best-effort
        if let Err(e) = self.notifier.notify_promo_activation(cmd.user_id, &promo).await {
            tracing::warn!(
                user_id = %cmd.user_id,
                promo_code = %promo.code,
                "Failed to send promo activation notification: {}",
                e
            );
        }

        tracing::info!(
            user_id = %cmd.user_id,
            promo_code = %promo.code,
            percentage,
            "Discount promo code granted"
        );

        Ok(RedeemDiscountOutcome { promo, discount })
    }
}
