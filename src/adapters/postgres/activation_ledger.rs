//! PostgreSQL implementation of ActivationLedger.
//!
//! The UNIQUE(promo_code_id, user_id) constraint carries the one-activation
//! invariant; `record` leans on INSERT ... ON CONFLICT DO NOTHING so racing
//! duplicates converge on the same row instead of erroring.

use crate::domain::foundation::{ActivationId, DomainError, ErrorCode, PaymentId, PromoCodeId, UserId};
use crate::domain::promo::PromoCodeActivation;
use crate::ports::{ActivationLedger, ActivationRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the ActivationLedger port.
pub struct PostgresActivationLedger {
    pool: PgPool,
}

impl PostgresActivationLedger {
    /// Creates a new PostgresActivationLedger with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an activation.
#[derive(Debug, sqlx::FromRow)]
struct ActivationRow {
    id: i64,
    promo_code_id: i64,
    user_id: i64,
    payment_id: Option<i64>,
    activated_at: DateTime<Utc>,
}

impl From<ActivationRow> for PromoCodeActivation {
    fn from(row: ActivationRow) -> Self {
        PromoCodeActivation {
            id: ActivationId::new(row.id),
            promo_code_id: PromoCodeId::new(row.promo_code_id),
            user_id: UserId::new(row.user_id),
            payment_id: row.payment_id.map(PaymentId::new),
            activated_at: row.activated_at,
        }
    }
}

#[async_trait]
impl ActivationLedger for PostgresActivationLedger {
    async fn find(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
    ) -> Result<Option<PromoCodeActivation>, DomainError> {
        let row: Option<ActivationRow> = sqlx::query_as(
            r#"
            SELECT id, promo_code_id, user_id, payment_id, activated_at
            FROM promo_code_activations
            WHERE promo_code_id = $1 AND user_id = $2
            "#,
        )
        .bind(promo_code_id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find activation: {}", e),
            )
        })?;

        Ok(row.map(PromoCodeActivation::from))
    }

    async fn record(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: Option<PaymentId>,
    ) -> Result<ActivationRecord, DomainError> {
        let inserted: Option<ActivationRow> = sqlx::query_as(
            r#"
            INSERT INTO promo_code_activations (promo_code_id, user_id, payment_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (promo_code_id, user_id) DO NOTHING
            RETURNING id, promo_code_id, user_id, payment_id, activated_at
            "#,
        )
        .bind(promo_code_id.value())
        .bind(user_id.value())
        .bind(payment_id.map(|p| p.value()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record activation: {}", e),
            )
        })?;

        if let Some(row) = inserted {
            return Ok(ActivationRecord::Recorded(row.into()));
        }

        // Conflict path: someone else wrote the row; fetch it.
        match self.find(promo_code_id, user_id).await? {
            Some(existing) => Ok(ActivationRecord::AlreadyRecorded(existing)),
            None => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!(
                    "Activation for promo {} user {} conflicted but cannot be read back",
                    promo_code_id, user_id
                ),
            )),
        }
    }

    async fn attach_payment(
        &self,
        promo_code_id: PromoCodeId,
        user_id: UserId,
        payment_id: PaymentId,
    ) -> Result<bool, DomainError> {
        // The NULL guard makes the linkage first-wins under concurrency.
        let result = sqlx::query(
            r#"
            UPDATE promo_code_activations
            SET payment_id = $3
            WHERE promo_code_id = $1 AND user_id = $2 AND payment_id IS NULL
            "#,
        )
        .bind(promo_code_id.value())
        .bind(user_id.value())
        .bind(payment_id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to attach payment to activation: {}", e),
            )
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_promo(
        &self,
        promo_code_id: PromoCodeId,
    ) -> Result<Vec<PromoCodeActivation>, DomainError> {
        let rows: Vec<ActivationRow> = sqlx::query_as(
            r#"
            SELECT id, promo_code_id, user_id, payment_id, activated_at
            FROM promo_code_activations
            WHERE promo_code_id = $1
            ORDER BY activated_at DESC
            "#,
        )
        .bind(promo_code_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list activations: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(PromoCodeActivation::from).collect())
    }

    async fn count_for_promo(&self, promo_code_id: PromoCodeId) -> Result<i64, DomainError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM promo_code_activations WHERE promo_code_id = $1")
                .bind(promo_code_id.value())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to count activations: {}", e),
                    )
                })?;

        Ok(count.0)
    }
}
