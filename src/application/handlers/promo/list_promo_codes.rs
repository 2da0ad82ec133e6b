//! ListPromoCodesHandler - Admin query over the catalog.

use std::sync::Arc;

use crate::domain::promo::{PromoCode, PromoError};
use crate::ports::PromoCodeCatalog;

/// Query for listing promo codes.
#[derive(Debug, Clone, Copy)]
pub struct ListPromoCodesQuery {
    /// Include codes with the active flag cleared.
    pub include_inactive: bool,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListPromoCodesQuery {
    fn default() -> Self {
        Self {
            include_inactive: false,
            limit: 50,
            offset: 0,
        }
    }
}

/// Catalog listing, newest first, plus the full catalog size.
#[derive(Debug, Clone)]
pub struct PromoCodeListing {
    pub codes: Vec<PromoCode>,
    pub total_in_catalog: i64,
}

/// Handler for the admin catalog listing.
pub struct ListPromoCodesHandler {
    catalog: Arc<dyn PromoCodeCatalog>,
}

impl ListPromoCodesHandler {
    pub fn new(catalog: Arc<dyn PromoCodeCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, query: ListPromoCodesQuery) -> Result<PromoCodeListing, PromoError> {
        let codes = if query.include_inactive {
            self.catalog.list_all(query.limit, query.offset).await?
        } else {
            self.catalog.list_active(query.limit, query.offset).await?
        };
        let total_in_catalog = self.catalog.count().await?;

        Ok(PromoCodeListing {
            codes,
            total_in_catalog,
        })
    }
}
