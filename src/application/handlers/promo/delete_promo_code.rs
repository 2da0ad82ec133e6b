//! DeletePromoCodeHandler - Admin command for removing promo codes.

use std::sync::Arc;

use crate::domain::foundation::PromoCodeId;
use crate::domain::promo::PromoError;
use crate::ports::PromoCodeCatalog;

/// Handler for promo code deletion.
///
/// Deletion cascades: held discounts sourced from the code are revoked, its
/// activation history is dropped, and payments that referenced it keep their
/// rows with the reference cleared. The storage adapter runs the cascade in
/// one transaction.
pub struct DeletePromoCodeHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
}

impl DeletePromoCodeHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, id: PromoCodeId) -> Result<(), PromoError> {
        if !self.catalog.delete(id).await? {
            return Err(PromoError::PromoNotFound(id));
        }
        tracing::info!(promo_code_id = %id, "Promo code deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryPromoStore;
    use crate::domain::promo::{NewPromoCode, PromoCodeType};

    #[tokio::test]
    async fn delete_removes_the_code() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = DeletePromoCodeHandler::new(store.clone());
        let promo = store
            .create(NewPromoCode {
                code: "BYE".to_string(),
                promo_type: PromoCodeType::BonusDays,
                bonus_days: Some(7),
                discount_percentage: None,
                max_activations: 10,
                is_active: true,
                valid_until: None,
            })
            .await
            .unwrap();

        handler.handle(promo.id).await.unwrap();
        assert!(store.find_by_id(promo.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_missing_code_reports_not_found() {
        let store = Arc::new(InMemoryPromoStore::new());
        let handler = DeletePromoCodeHandler::new(store.clone());

        let err = handler.handle(PromoCodeId::new(404)).await.unwrap_err();
        assert!(matches!(err, PromoError::PromoNotFound(_)));
    }
}
