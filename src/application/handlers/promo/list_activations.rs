//! ListActivationsHandler - Admin query over a code's redemption history.

use std::sync::Arc;

use crate::domain::foundation::PromoCodeId;
use crate::domain::promo::{PromoCode, PromoCodeActivation, PromoError};
use crate::ports::{ActivationLedger, PromoCodeCatalog};

/// Redemption history for one promo code, newest first.
#[derive(Debug, Clone)]
pub struct ActivationListing {
    pub promo: PromoCode,
    pub activations: Vec<PromoCodeActivation>,
    pub total: i64,
    /// How many of the activations were attributed to a payment.
    pub linked_to_payment: i64,
}

/// Handler for the activation history view.
pub struct ListActivationsHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    ledger: Arc<dyn ActivationLedger>,
}

impl ListActivationsHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>, ledger: Arc<dyn ActivationLedger>) -> Self {
        Self { catalog, ledger }
    }

    pub async fn handle(&self, promo_code_id: PromoCodeId) -> Result<ActivationListing, PromoError> {
        let promo = self
            .catalog
            .find_by_id(promo_code_id)
            .await?
            .ok_or(PromoError::PromoNotFound(promo_code_id))?;

        let activations = self.ledger.list_for_promo(promo_code_id).await?;
        let total = self.ledger.count_for_promo(promo_code_id).await?;
        let linked_to_payment = activations
            .iter()
            .filter(|a| a.is_linked_to_payment())
            .count() as i64;

        Ok(ActivationListing {
            promo,
            activations,
            total,
            linked_to_payment,
        })
    }
}
