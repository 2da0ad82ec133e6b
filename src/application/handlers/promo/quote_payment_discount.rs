//! QuotePaymentDiscountHandler - Computes the price a user will actually pay.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::promo::{discounted_price, ActiveDiscount, PromoError};
use crate::ports::{ActiveDiscountStore, PromoCodeCatalog};

/// Command to quote a payment amount against the user's held discount.
#[derive(Debug, Clone)]
pub struct QuotePaymentDiscountCommand {
    pub user_id: UserId,
    pub original_price: f64,
}

/// A price quote. When no discount is held the quote passes the original
/// price through unchanged.
#[derive(Debug, Clone)]
pub struct PaymentQuote {
    pub original_price: f64,
    pub final_price: f64,
    pub discount_amount: f64,
    /// The discount the quote is based on, if any.
    pub discount: Option<ActiveDiscount>,
    /// Code string of the source promo, when it still exists.
    pub code: Option<String>,
}

impl PaymentQuote {
    pub fn has_discount(&self) -> bool {
        self.discount.is_some()
    }
}

/// Query handler producing the checkout quote.
///
/// This is a pure read: the discount stays held until a completed payment
/// consumes it, and a quote must not mutate state. The snapshot percentage
/// is applied even if the source code has since expired; expiry is settled
/// by the read path that owns clearing, not here.
pub struct QuotePaymentDiscountHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    discounts: Arc<dyn ActiveDiscountStore>,
}

impl QuotePaymentDiscountHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>, discounts: Arc<dyn ActiveDiscountStore>) -> Self {
        Self { catalog, discounts }
    }

    pub async fn handle(
        &self,
        cmd: QuotePaymentDiscountCommand,
    ) -> Result<PaymentQuote, PromoError> {
        if cmd.original_price < 0.0 {
            return Err(PromoError::validation(
                "original_price",
                "price cannot be negative",
            ));
        }

        let discount = match self.discounts.get(cmd.user_id).await? {
            Some(discount) => discount,
            None => {
                return Ok(PaymentQuote {
                    original_price: cmd.original_price,
                    final_price: cmd.original_price,
                    discount_amount: 0.0,
                    discount: None,
                    code: None,
                });
            }
        };

        let code = self
            .catalog
            .find_by_id(discount.promo_code_id)
            .await?
            .map(|p| p.code);

        let priced = discounted_price(cmd.original_price, discount.discount_percentage);

        Ok(PaymentQuote {
            original_price: cmd.original_price,
            final_price: priced.final_price,
            discount_amount: priced.discount_amount,
            discount: Some(discount),
            code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPromoStore;
    use crate::domain::foundation::PromoCodeId;
    use crate::domain::promo::{NewPromoCode, PromoCodeType};
    use chrono::Utc;

    fn handler_over(store: &Arc<InMemoryPromoStore>) -> QuotePaymentDiscountHandler {
        QuotePaymentDiscountHandler::new(store.clone(), store.clone())
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

    #[tokio::test]
    async fn no_discount_passes_price_through() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);

        let quote = handler
            .handle(QuotePaymentDiscountCommand {
                user_id: UserId::new(1),
                original_price: 49.99,
            })
            .await
            .unwrap();

        assert!(!quote.has_discount());
        assert_eq!(quote.final_price, 49.99);
        assert_eq!(quote.discount_amount, 0.0);
    }

    #[tokio::test]
    async fn held_discount_is_applied_to_the_quote() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        let promo = store
            .create(NewPromoCode {
                code: "SAVE20".to_string(),
                promo_type: PromoCodeType::Discount,
                bonus_days: None,
                discount_percentage: Some(20),
                max_activations: 10,
                is_active: true,
                valid_until: None,
            })
            .await
            .unwrap();
        grant(&store, UserId::new(1), promo.id, 20).await;

        let quote = handler
            .handle(QuotePaymentDiscountCommand {
                user_id: UserId::new(1),
                original_price: 100.0,
            })
            .await
            .unwrap();

        assert_eq!(quote.final_price, 80.0);
        assert_eq!(quote.discount_amount, 20.0);
        assert_eq!(quote.code.as_deref(), Some("SAVE20"));
        // A quote never consumes.
        assert!(store.get(UserId::new(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn quote_works_even_when_source_code_is_gone() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);
        grant(&store, UserId::new(1), PromoCodeId::new(404), 25).await;

        let quote = handler
            .handle(QuotePaymentDiscountCommand {
                user_id: UserId::new(1),
                original_price: 40.0,
            })
            .await
            .unwrap();

        assert_eq!(quote.final_price, 30.0);
        assert_eq!(quote.code, None);
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = handler_over(&store);

        let err = handler
            .handle(QuotePaymentDiscountCommand {
                user_id: UserId::new(1),
                original_price: -1.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PromoError::Validation { .. }));
    }
}
