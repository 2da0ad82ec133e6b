//! PostgreSQL implementation of ActiveDiscountStore.
//!
//! user_id is the primary key of active_discounts, so the one-discount-per-
//! user invariant is a constraint, not application logic. `set` inserts with
//! ON CONFLICT DO NOTHING and reports the survivor.

use crate::domain::foundation::{DomainError, ErrorCode, PromoCodeId, UserId};
use crate::domain::promo::ActiveDiscount;
use crate::ports::{ActiveDiscountStore, DiscountGrant};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the ActiveDiscountStore port.
pub struct PostgresActiveDiscountStore {
    pool: PgPool,
}

impl PostgresActiveDiscountStore {
    /// Creates a new PostgresActiveDiscountStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an active discount.
#[derive(Debug, sqlx::FromRow)]
struct ActiveDiscountRow {
    user_id: i64,
    promo_code_id: i64,
    discount_percentage: i32,
    activated_at: DateTime<Utc>,
}

impl From<ActiveDiscountRow> for ActiveDiscount {
    fn from(row: ActiveDiscountRow) -> Self {
        ActiveDiscount {
            user_id: UserId::new(row.user_id),
            promo_code_id: PromoCodeId::new(row.promo_code_id),
            discount_percentage: row.discount_percentage,
            activated_at: row.activated_at,
        }
    }
}

#[async_trait]
impl ActiveDiscountStore for PostgresActiveDiscountStore {
    async fn get(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError> {
        let row: Option<ActiveDiscountRow> = sqlx::query_as(
            r#"
            SELECT user_id, promo_code_id, discount_percentage, activated_at
            FROM active_discounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to get active discount: {}", e),
            )
        })?;

        Ok(row.map(ActiveDiscount::from))
    }

    async fn set(&self, discount: ActiveDiscount) -> Result<DiscountGrant, DomainError> {
        let inserted: Option<ActiveDiscountRow> = sqlx::query_as(
            r#"
            INSERT INTO active_discounts (user_id, promo_code_id, discount_percentage, activated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING user_id, promo_code_id, discount_percentage, activated_at
            "#,
        )
        .bind(discount.user_id.value())
        .bind(discount.promo_code_id.value())
        .bind(discount.discount_percentage)
        .bind(discount.activated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to grant discount: {}", e),
            )
        })?;

        if let Some(row) = inserted {
            return Ok(DiscountGrant::Granted(row.into()));
        }

        match self.get(discount.user_id).await? {
            Some(existing) => Ok(DiscountGrant::AlreadyActive(existing)),
            None => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!(
                    "Discount grant for user {} conflicted but cannot be read back",
                    discount.user_id
                ),
            )),
        }
    }

    async fn clear(&self, user_id: UserId) -> Result<Option<ActiveDiscount>, DomainError> {
        let row: Option<ActiveDiscountRow> = sqlx::query_as(
            r#"
            DELETE FROM active_discounts
            WHERE user_id = $1
            RETURNING user_id, promo_code_id, discount_percentage, activated_at
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to clear active discount: {}", e),
            )
        })?;

        Ok(row.map(ActiveDiscount::from))
    }

    async fn clear_by_promo(&self, promo_code_id: PromoCodeId) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM active_discounts WHERE promo_code_id = $1")
            .bind(promo_code_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to clear discounts for promo code: {}", e),
                )
            })?;

        Ok(result.rows_affected())
    }
}
