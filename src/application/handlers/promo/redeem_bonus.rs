//! RedeemBonusHandler - Command handler for redeeming bonus-days promo codes.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::promo::{
    PromoCode, PromoCodeActivation, PromoCodeType, PromoError, RedemptionCode,
};
use crate::ports::{
    ActivationLedger, NotificationSender, PromoCodeCatalog, SubscriptionExtender, UsageIncrement,
};
use chrono::{DateTime, Utc};

/// Command to redeem a bonus-days promo code for a user.
#[derive(Debug, Clone)]
pub struct RedeemBonusCommand {
    pub user_id: UserId,
    pub code: String,
}

/// Result of a successful bonus redemption.
#[derive(Debug, Clone)]
pub struct RedeemBonusOutcome {
    pub promo: PromoCode,
    pub bonus_days: i32,
    pub new_end_date: DateTime<Utc>,
    pub activation: PromoCodeActivation,
}

/// Handler for bonus-days redemptions.
///
/// Order of effects: the subscription is extended before any promo
/// bookkeeping is written, so an extension failure leaves the code fully
/// redeemable. The reverse gap (bookkeeping fails after the extension went
/// through) surfaces as `IntegrityAnomaly` for manual reconciliation.
pub struct RedeemBonusHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    ledger: Arc<dyn ActivationLedger>,
    extender: Arc<dyn SubscriptionExtender>,
    notifier: Arc<dyn NotificationSender>,
}

impl RedeemBonusHandler {
    pub fn new(
        catalog: Arc<dyn PromoCodeCatalog>,
        ledger: Arc<dyn ActivationLedger>,
        extender: Arc<dyn SubscriptionExtender>,
        notifier: Arc<dyn NotificationSender>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            extender,
            notifier,
        }
    }

    pub async fn handle(&self, cmd: RedeemBonusCommand) -> Result<RedeemBonusOutcome, PromoError> {
        // 1. Normalize the code string
        let code = RedemptionCode::try_new(&cmd.code)?;

        // 2. Look up an eligible code; every ineligibility (unknown, inactive,
        //    expired, exhausted, wrong type) reads the same to the caller.
        let promo = self
            .catalog
            .find_eligible(code.as_str(), PromoCodeType::BonusDays, Utc::now())
            .await?
            .ok_or_else(|| PromoError::code_not_found(code.as_str()))?;

        let bonus_days = promo
            .bonus_days
            .ok_or_else(|| PromoError::integrity_anomaly(format!(
                "bonus_days promo {} has no bonus_days value",
                promo.id
            )))?;

        // 3. Reject repeat redemptions
        if self.ledger.find(promo.id, cmd.user_id).await?.is_some() {
            return Err(PromoError::already_used(code.as_str()));
        }

        // 4. Extend the subscription; nothing is written yet, so a failure
        //    here costs nothing.
        let new_end_date = self
            .extender
            .extend(cmd.user_id, bonus_days, code.as_str())
            .await
            .map_err(|e| PromoError::extension_failed(cmd.user_id, e.to_string()))?;

        // 5. Record the activation. A lost race to this row means another
        //    call redeemed concurrently and the extension above doubled up.
        let record = self.ledger.record(promo.id, cmd.user_id, None).await?;
        if !record.is_new() {
            let err = PromoError::integrity_anomaly(format!(
                "user {} redeemed promo {} concurrently; subscription extended twice",
                cmd.user_id, promo.id
            ));
            tracing::error!("{}", err);
            return Err(err);
        }
        let activation = record.activation().clone();

        // 6. Claim a usage slot; the conditional increment is what actually
        //    enforces the cap under concurrency.
        match self.catalog.increment_usage(promo.id, false).await? {
            UsageIncrement::Updated => {}
            UsageIncrement::CapReached | UsageIncrement::NotFound => {
                let err = PromoError::integrity_anomaly(format!(
                    "promo {} activation recorded for user {} but no usage slot was available",
                    promo.id, cmd.user_id
                ));
                tracing::error!("{}", err);
                return Err(err);
            }
        }

        // 7. Notify, best-effort
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
            bonus_days,
            "Bonus promo code redeemed"
        );

        Ok(RedeemBonusOutcome {
            promo,
            bonus_days,
            new_end_date,
            activation,
        })
    }
}
