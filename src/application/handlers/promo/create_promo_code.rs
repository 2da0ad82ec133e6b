//! CreatePromoCodeHandler - Admin command for minting promo codes.

use std::sync::Arc;

use crate::domain::promo::{NewPromoCode, PromoCode, PromoError};
use crate::ports::PromoCodeCatalog;

/// Handler for creating promo codes.
pub struct CreatePromoCodeHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
}

impl CreatePromoCodeHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, input: NewPromoCode) -> Result<PromoCode, PromoError> {
        let input = input.validated()?;
        let promo = self.catalog.create(input).await?;

        tracing::info!(
            promo_code = %promo.code,
            promo_type = %promo.promo_type,
            max_activations = promo.max_activations,
            "Promo code created"
        );

        Ok(promo)
    }
}
