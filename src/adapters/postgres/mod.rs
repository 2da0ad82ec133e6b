//! PostgreSQL adapters for the storage ports.

mod activation_ledger;
mod active_discount_store;
mod payment_store;
mod promo_code_catalog;

pub use activation_ledger::PostgresActivationLedger;
pub use active_discount_store::PostgresActiveDiscountStore;
pub use payment_store::PostgresPaymentStore;
pub use promo_code_catalog::PostgresPromoCodeCatalog;

/// Embedded schema migrations. The engine never runs them itself; the
/// embedding process applies them at startup before wiring the adapters.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[cfg(test)]
mod tests {
    use super::MIGRATOR;

    #[test]
    fn migrations_are_embedded() {
        assert!(MIGRATOR.iter().any(|m| m.version == 1));
    }
}
