//! GetActiveDiscountHandler - Query handler for a user's held discount.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::promo::{ActiveDiscount, PromoError};
use crate::ports::{ActiveDiscountStore, PromoCodeCatalog};
use chrono::Utc;

/// The user's held discount together with the code string it came from.
#[derive(Debug, Clone)]
pub struct ActiveDiscountView {
    pub discount: ActiveDiscount,
    pub code: String,
}

/// Query handler returning the user's active discount, if any.
///
/// Expiry is enforced lazily on read: a discount whose source code has
/// expired since the grant is removed here and reported as absent. Orphans
/// (source code deleted) are healed the same way. The snapshot percentage is
/// honored even if the code was deactivated or edited after the grant.
pub struct GetActiveDiscountHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
    discounts: Arc<dyn ActiveDiscountStore>,
}

impl GetActiveDiscountHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>, discounts: Arc<dyn ActiveDiscountStore>) -> Self {
        Self { catalog, discounts }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<Option<ActiveDiscountView>, PromoError> {
        let discount = match self.discounts.get(user_id).await? {
            Some(discount) => discount,
            None => return Ok(None),
        };

        let promo = match self.catalog.find_by_id(discount.promo_code_id).await? {
            Some(promo) => promo,
            None => {
                tracing::warn!(
                    user_id = %user_id,
                    promo_code_id = %discount.promo_code_id,
                    "Clearing orphaned discount for deleted promo code"
                );
                self.discounts.clear(user_id).await?;
                return Ok(None);
            }
        };

        if promo.is_expired(Utc::now()) {
            tracing::info!(
                user_id = %user_id,
                promo_code = %promo.code,
                "Clearing discount whose source code expired"
            );
            self.discounts.clear(user_id).await?;
            return Ok(None);
        }

        Ok(Some(ActiveDiscountView {
            discount,
            code: promo.code,
        }))
    }
}
