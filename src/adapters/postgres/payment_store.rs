//! PostgreSQL read adapter over the billing layer's payments table.

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, PromoCodeId, UserId};
use crate::domain::promo::PaymentRecord;
use crate::ports::PaymentStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the PaymentStore port.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new PostgresPaymentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    user_id: i64,
    amount: f64,
    discount_applied: bool,
    promo_code_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        PaymentRecord {
            id: PaymentId::new(row.id),
            user_id: UserId::new(row.user_id),
            amount: row.amount,
            discount_applied: row.discount_applied,
            promo_code_id: row.promo_code_id.map(PromoCodeId::new),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, amount, discount_applied, promo_code_id, created_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment: {}", e),
            )
        })?;

        Ok(row.map(PaymentRecord::from))
    }
}
