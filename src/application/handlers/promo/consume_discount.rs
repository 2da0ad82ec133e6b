//! ConsumeDiscountHandler - Settles a spent discount against a completed payment.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, UserId};
use crate::domain::promo::PromoError;
use crate::ports::{
    ActivationLedger, ActiveDiscountStore, PaymentStore, PromoCodeCatalog, UsageIncrement,
};

/// Command to reconcile a completed payment's discount.
#[derive(Debug, Clone)]
pub struct ConsumeDiscountCommand {
    pub user_id: UserId,
    pub payment_id: PaymentId,
}

/// Handler invoked by the billing layer once a payment is confirmed paid.
///
/// The payment record drives the whole protocol: its `discount_applied` flag
/// and `promo_code_id` say which discount was charged. Returns `Ok(true)`
/// when the bookkeeping is settled, `Ok(false)` when there is nothing to
/// reconcile or a ledger write failed (logged, no retry here).
///
/// The payment-linkage write is the exactly-once gate: it only succeeds
/// while the activation has no payment attached, so a replayed completion
/// event never double-attributes. The usage counter is bumped with overflow
/// allowed: the discount was granted while capacity existed, and a completed
/// payment's bookkeeping must never fail because the cap has since filled.
pub struct ConsumeDiscountHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    ledger: Arc<dyn ActivationLedger>,
    discounts: Arc<dyn ActiveDiscountStore>,
    payments: Arc<dyn PaymentStore>,
}

impl ConsumeDiscountHandler {
    pub fn new(
        catalog: Arc<dyn PromoCodeCatalog>,
        ledger: Arc<dyn ActivationLedger>,
        discounts: Arc<dyn ActiveDiscountStore>,
        payments: Arc<dyn PaymentStore>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            discounts,
            payments,
        }
    }

    pub async fn handle(&self, cmd: ConsumeDiscountCommand) -> Result<bool, PromoError> {
        // 1. Consumption may be invoked defensively; a missing payment is a
        //    warning, not an error.
        let payment = match self.payments.find_by_id(cmd.payment_id).await? {
            Some(payment) => payment,
            None => {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    payment_id = %cmd.payment_id,
                    "Discount consumption requested for unknown payment"
                );
                return Ok(false);
            }
        };

        // 2. No discount on this payment, nothing to reconcile.
        if !payment.discount_applied {
            return Ok(false);
        }

        // 3. Flag set without a code reference is an anomaly left behind by
        //    the billing layer.
        let promo_id = match payment.promo_code_id {
            Some(promo_id) => promo_id,
            None => {
                tracing::warn!(
                    user_id = %cmd.user_id,
                    payment_id = %cmd.payment_id,
                    "Payment has discount_applied set but no promo code reference"
                );
                return Ok(false);
            }
        };

        // 4. A held discount from a *different* code belongs to a later
        //    grant and must survive this consumption.
        let held = self.discounts.get(cmd.user_id).await?;
        let clear_held = held
            .as_ref()
            .map(|d| d.promo_code_id == promo_id)
            .unwrap_or(false);

        // 5. Settle the ledger. First writer attaches the payment; an
        //    activation already linked needs no further write; a missing
        //    activation is recorded with the payment attached and claims its
        //    usage slot, past the cap if necessary.
        let settled = match self.ledger.find(promo_id, cmd.user_id).await? {
            Some(activation) if activation.payment_id.is_none() => self
                .ledger
                .attach_payment(promo_id, cmd.user_id, cmd.payment_id)
                .await
                .map(|_| ()),
            Some(_) => Ok(()),
            None => match self.ledger.record(promo_id, cmd.user_id, Some(cmd.payment_id)).await {
                Ok(record) if record.is_new() => self
                    .catalog
                    .increment_usage(promo_id, true)
                    .await
                    .and_then(|outcome| match outcome {
                        UsageIncrement::Updated => Ok(()),
                        // Overflow is allowed, so zero rows means the promo
                        // row itself is gone and the counter write was lost.
                        UsageIncrement::CapReached | UsageIncrement::NotFound => {
                            Err(DomainError::new(
                                ErrorCode::PromoCodeNotFound,
                                format!(
                                    "promo code {} vanished before its usage slot was claimed",
                                    promo_id
                                ),
                            ))
                        }
                    }),
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            },
        };

        // 6. A ledger write failure aborts with false; the caller owns any
        //    retry of the whole call.
        if let Err(e) = settled {
            tracing::error!(
                user_id = %cmd.user_id,
                payment_id = %cmd.payment_id,
                promo_code_id = %promo_id,
                "Ledger write failed during discount consumption: {}",
                e
            );
            return Ok(false);
        }

        // 7. Retire the held discount only when it matches this payment's code.
        if clear_held {
            self.discounts.clear(cmd.user_id).await?;
        }

        tracing::info!(
            user_id = %cmd.user_id,
            payment_id = %cmd.payment_id,
            promo_code_id = %promo_id,
            "Discount consumed"
        );

        // 8. Every port write above committed durably on its own.
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPromoStore;
    use crate::domain::foundation::PromoCodeId;
    use crate::domain::promo::{ActiveDiscount, NewPromoCode, PaymentRecord, PromoCodeType};
    use chrono::Utc;

    fn handler_over(store: &Arc<InMemoryPromoStore>) -> ConsumeDiscountHandler {
        ConsumeDiscountHandler::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    fn discount_code(code: &str, pct: i32, max: i32) -> NewPromoCode {
        NewPromoCode {
            code: code.to_string(),
            promo_type: PromoCodeType::Discount,
            bonus_days: None,
            discount_percentage: Some(pct),
            max_activations: max,
            is_active: true,
            valid_until: None,
        }
    }

    async fn grant(store: &InMemoryPromoStore, user: UserId, promo_id: PromoCodeId, pct: i32) {
        store
            .set(ActiveDiscount {
                user_id: user,
                promo_code_id: promo_id,
                discount_percentage: pct,
                activated_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn seed_payment(
        store: &InMemoryPromoStore,
        id: i64,
        user: UserId,
        promo_id: Option<PromoCodeId>,
    ) {
        store.insert_payment(PaymentRecord {
            id: PaymentId::new(id),
            user_id: user,
            amount: 80.0,
            discount_applied: promo_id.is_some(),
            promo_code_id: promo_id,
            created_at: Utc::now(),
        });
    }

    #[tokio::test]
    async fn consumption_links_increments_and_clears() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(1);
        let promo = store.create(discount_code("SAVE20", 20, 10)).await.unwrap();
        grant(&store, user, promo.id, 20).await;
        seed_payment(&store, 100, user, Some(promo.id));

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap();

        assert!(consumed);
        assert!(store.get(user).await.unwrap().is_none());
        assert_eq!(store.promo_snapshot(promo.id).unwrap().current_activations, 1);
        let activation = store.find(promo.id, user).await.unwrap().unwrap();
        assert_eq!(activation.payment_id, Some(PaymentId::new(100)));
    }

    #[tokio::test]
    async fn unknown_payment_consumes_nothing() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(1);
        let promo = store.create(discount_code("HELD", 20, 10)).await.unwrap();
        grant(&store, user, promo.id, 20).await;

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(404),
            })
            .await
            .unwrap();

        assert!(!consumed);
        // Discount still held.
        assert!(store.get(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn undiscounted_payment_is_a_noop() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(1);
        let promo = store.create(discount_code("HELD", 20, 10)).await.unwrap();
        grant(&store, user, promo.id, 20).await;
        seed_payment(&store, 100, user, None);

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap();

        assert!(!consumed);
        assert!(store.get(user).await.unwrap().is_some());
        assert_eq!(store.count_for_promo(promo.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn discount_flag_without_code_reference_is_an_anomaly_noop() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(1);
        store.insert_payment(PaymentRecord {
            id: PaymentId::new(100),
            user_id: user,
            amount: 80.0,
            discount_applied: true,
            promo_code_id: None,
            created_at: Utc::now(),
        });

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap();

        assert!(!consumed);
    }

    #[tokio::test]
    async fn replayed_completion_does_not_duplicate_writes() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(2);
        let promo = store.create(discount_code("ONCE", 20, 10)).await.unwrap();
        grant(&store, user, promo.id, 20).await;
        seed_payment(&store, 100, user, Some(promo.id));

        let cmd = ConsumeDiscountCommand {
            user_id: user,
            payment_id: PaymentId::new(100),
        };
        assert!(handler.handle(cmd.clone()).await.unwrap());
        // Replay settles without touching the ledger or the counter again.
        handler.handle(cmd).await.unwrap();

        assert_eq!(store.promo_snapshot(promo.id).unwrap().current_activations, 1);
        assert_eq!(store.count_for_promo(promo.id).await.unwrap(), 1);
        let activation = store.find(promo.id, user).await.unwrap().unwrap();
        assert_eq!(activation.payment_id, Some(PaymentId::new(100)));
    }

    #[tokio::test]
    async fn second_payment_never_steals_the_linkage() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(3);
        let promo = store.create(discount_code("FIRST", 20, 10)).await.unwrap();
        grant(&store, user, promo.id, 20).await;
        seed_payment(&store, 100, user, Some(promo.id));
        seed_payment(&store, 200, user, Some(promo.id));

        assert!(handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap());
        handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(200),
            })
            .await
            .unwrap();

        let activation = store.find(promo.id, user).await.unwrap().unwrap();
        assert_eq!(activation.payment_id, Some(PaymentId::new(100)));
        assert_eq!(store.promo_snapshot(promo.id).unwrap().current_activations, 1);
    }

    #[tokio::test]
    async fn held_discount_from_a_different_code_survives() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(4);
        let old_promo = store.create(discount_code("OLD", 20, 10)).await.unwrap();
        let new_promo = store.create(discount_code("NEW", 50, 10)).await.unwrap();

        // The payment consumed OLD; the user has since been granted NEW.
        grant(&store, user, new_promo.id, 50).await;
        seed_payment(&store, 100, user, Some(old_promo.id));

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap();

        assert!(consumed);
        let held = store.get(user).await.unwrap().unwrap();
        assert_eq!(held.promo_code_id, new_promo.id);
    }

    #[tokio::test]
    async fn payment_referencing_a_deleted_promo_is_not_settled() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let user = UserId::new(6);

        // The promo behind this payment's discount no longer exists.
        let gone = PromoCodeId::new(999);
        grant(&store, user, gone, 20).await;
        seed_payment(&store, 100, user, Some(gone));

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(100),
            })
            .await
            .unwrap();

        assert!(!consumed);
        // The discount stays held; nothing was settled.
        assert!(store.get(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn consumption_overflows_past_the_cap() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let promo = store.create(discount_code("TINY", 20, 1)).await.unwrap();

        // The cap filled after this user's grant.
        store.increment_usage(promo.id, false).await.unwrap();
        let user = UserId::new(7);
        grant(&store, user, promo.id, 20).await;
        seed_payment(&store, 300, user, Some(promo.id));

        let consumed = handler
            .handle(ConsumeDiscountCommand {
                user_id: user,
                payment_id: PaymentId::new(300),
            })
            .await
            .unwrap();

        assert!(consumed);
        let snapshot = store.promo_snapshot(promo.id).unwrap();
        assert_eq!(snapshot.current_activations, 2);
        assert!(snapshot.current_activations > snapshot.max_activations);
    }
}
