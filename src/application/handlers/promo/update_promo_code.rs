//! UpdatePromoCodeHandler - Admin command for editing promo codes.

use std::sync::Arc;

use crate::domain::foundation::PromoCodeId;
use crate::domain::promo::{PromoCode, PromoCodeUpdate, PromoError};
use crate::ports::PromoCodeCatalog;

/// Handler for partial promo code updates. The code string and type are
/// immutable after creation; edits never touch already-granted discounts.
pub struct UpdatePromoCodeHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
}

impl UpdatePromoCodeHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(
        &self,
        id: PromoCodeId,
        update: PromoCodeUpdate,
    ) -> Result<PromoCode, PromoError> {
        update.validate()?;

        let promo = self
            .catalog
            .update(id, update)
            .await?
            .ok_or(PromoError::PromoNotFound(id))?;

        tracing::info!(promo_code = %promo.code, "Promo code updated");
        Ok(promo)
    }
}
