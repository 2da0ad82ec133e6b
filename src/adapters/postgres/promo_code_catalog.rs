//! PostgreSQL implementation of PromoCodeCatalog.
//!
//! Provides persistent storage for promo codes using PostgreSQL. Capacity
//! enforcement lives in the SQL: the conditional increment is a single
//! UPDATE, so concurrent redemptions serialize on the row lock and at most
//! `max_activations` strict increments ever succeed.

use crate::domain::foundation::{DomainError, ErrorCode, PromoCodeId};
use crate::domain::promo::{NewPromoCode, PromoCode, PromoCodeType, PromoCodeUpdate};
use crate::ports::{PromoCodeCatalog, UsageIncrement};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// PostgreSQL implementation of the PromoCodeCatalog port.
pub struct PostgresPromoCodeCatalog {
    pool: PgPool,
}

impl PostgresPromoCodeCatalog {
    /// Creates a new PostgresPromoCodeCatalog with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a promo code.
#[derive(Debug, sqlx::FromRow)]
struct PromoCodeRow {
    id: i64,
    code: String,
    promo_type: String,
    bonus_days: Option<i32>,
    discount_percentage: Option<i32>,
    max_activations: i32,
    current_activations: i32,
    is_active: bool,
    valid_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PromoCodeRow> for PromoCode {
    type Error = DomainError;

    fn try_from(row: PromoCodeRow) -> Result<Self, Self::Error> {
        let promo_type = PromoCodeType::parse(&row.promo_type).map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid promo_type value: {}", e),
            )
        })?;

        Ok(PromoCode {
            id: PromoCodeId::new(row.id),
            code: row.code,
            promo_type,
            bonus_days: row.bonus_days,
            discount_percentage: row.discount_percentage,
            max_activations: row.max_activations,
            current_activations: row.current_activations,
            is_active: row.is_active,
            valid_until: row.valid_until,
            created_at: row.created_at,
        })
    }
}

const PROMO_CODE_COLUMNS: &str = "id, code, promo_type, bonus_days, discount_percentage, \
     max_activations, current_activations, is_active, valid_until, created_at";

#[async_trait]
impl PromoCodeCatalog for PostgresPromoCodeCatalog {
    async fn create(&self, input: NewPromoCode) -> Result<PromoCode, DomainError> {
        let row: PromoCodeRow = sqlx::query_as(
            r#"
            INSERT INTO promo_codes (
                code, promo_type, bonus_days, discount_percentage,
                max_activations, current_activations, is_active, valid_until
            ) VALUES (UPPER($1), $2, $3, $4, $5, 0, $6, $7)
            RETURNING id, code, promo_type, bonus_days, discount_percentage,
                      max_activations, current_activations, is_active, valid_until, created_at
            "#,
        )
        .bind(&input.code)
        .bind(input.promo_type.as_str())
        .bind(input.bonus_days)
        .bind(input.discount_percentage)
        .bind(input.max_activations)
        .bind(input.is_active)
        .bind(input.valid_until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("promo_codes_code_key") {
                    return DomainError::new(
                        ErrorCode::DuplicatePromoCode,
                        format!("Promo code '{}' already exists", input.code),
                    )
                    .with_detail("code", input.code.clone());
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to create promo code: {}", e),
            )
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: PromoCodeId) -> Result<Option<PromoCode>, DomainError> {
        let row: Option<PromoCodeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE id = $1",
            PROMO_CODE_COLUMNS
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find promo code: {}", e),
            )
        })?;

        row.map(PromoCode::try_from).transpose()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<PromoCode>, DomainError> {
        let row: Option<PromoCodeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE code = UPPER($1)",
            PROMO_CODE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find promo code: {}", e),
            )
        })?;

        row.map(PromoCode::try_from).transpose()
    }

    async fn find_eligible(
        &self,
        code: &str,
        promo_type: PromoCodeType,
        now: DateTime<Utc>,
    ) -> Result<Option<PromoCode>, DomainError> {
        let row: Option<PromoCodeRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM promo_codes
            WHERE code = UPPER($1)
              AND promo_type = $2
              AND is_active = TRUE
              AND current_activations < max_activations
              AND (valid_until IS NULL OR valid_until > $3)
            "#,
            PROMO_CODE_COLUMNS
        ))
        .bind(code)
        .bind(promo_type.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find eligible promo code: {}", e),
            )
        })?;

        row.map(PromoCode::try_from).transpose()
    }

    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError> {
        let rows: Vec<PromoCodeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes WHERE is_active = TRUE \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            PROMO_CODE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list promo codes: {}", e),
            )
        })?;

        rows.into_iter().map(PromoCode::try_from).collect()
    }

    async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, DomainError> {
        let rows: Vec<PromoCodeRow> = sqlx::query_as(&format!(
            "SELECT {} FROM promo_codes ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            PROMO_CODE_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list promo codes: {}", e),
            )
        })?;

        rows.into_iter().map(PromoCode::try_from).collect()
    }

    async fn count(&self) -> Result<i64, DomainError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM promo_codes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to count promo codes: {}", e),
                )
            })?;

        Ok(count.0)
    }

    async fn update(
        &self,
        id: PromoCodeId,
        update: PromoCodeUpdate,
    ) -> Result<Option<PromoCode>, DomainError> {
        // COALESCE handles the leave-untouched fields; the expiry uses an
        // explicit flag because Some(None) must overwrite with NULL.
        let row: Option<PromoCodeRow> = sqlx::query_as(
            r#"
            UPDATE promo_codes SET
                bonus_days = COALESCE($2, bonus_days),
                discount_percentage = COALESCE($3, discount_percentage),
                max_activations = COALESCE($4, max_activations),
                is_active = COALESCE($5, is_active),
                valid_until = CASE WHEN $6 THEN $7 ELSE valid_until END
            WHERE id = $1
            RETURNING id, code, promo_type, bonus_days, discount_percentage,
                      max_activations, current_activations, is_active, valid_until, created_at
            "#,
        )
        .bind(id.value())
        .bind(update.bonus_days)
        .bind(update.discount_percentage)
        .bind(update.max_activations)
        .bind(update.is_active)
        .bind(update.valid_until.is_some())
        .bind(update.valid_until.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update promo code: {}", e),
            )
        })?;

        row.map(PromoCode::try_from).transpose()
    }

    async fn delete(&self, id: PromoCodeId) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        // Dependents go first: discounts vanish, payments keep their row but
        // lose the reference, the activation history is removed.
        sqlx::query("DELETE FROM active_discounts WHERE promo_code_id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to clear discounts for promo code: {}", e),
                )
            })?;

        sqlx::query("UPDATE payments SET promo_code_id = NULL WHERE promo_code_id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to unlink payments from promo code: {}", e),
                )
            })?;

        sqlx::query("DELETE FROM promo_code_activations WHERE promo_code_id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete activations for promo code: {}", e),
                )
            })?;

        let result = sqlx::query("DELETE FROM promo_codes WHERE id = $1")
            .bind(id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete promo code: {}", e),
                )
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit promo code deletion: {}", e),
            )
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_usage(
        &self,
        id: PromoCodeId,
        allow_overflow: bool,
    ) -> Result<UsageIncrement, DomainError> {
        let query = if allow_overflow {
            "UPDATE promo_codes SET current_activations = current_activations + 1 WHERE id = $1"
        } else {
            "UPDATE promo_codes SET current_activations = current_activations + 1 \
             WHERE id = $1 AND current_activations < max_activations"
        };

        let result = sqlx::query(query)
            .bind(id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to increment promo code usage: {}", e),
                )
            })?;

        if result.rows_affected() > 0 {
            return Ok(UsageIncrement::Updated);
        }

        // Zero rows: distinguish a missing code from a full one.
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM promo_codes WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to check promo code existence: {}", e),
                )
            })?;

        if exists.is_some() {
            Ok(UsageIncrement::CapReached)
        } else {
            Ok(UsageIncrement::NotFound)
        }
    }

    async fn decrement_usage(&self, id: PromoCodeId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE promo_codes SET current_activations = current_activations - 1 \
             WHERE id = $1 AND current_activations > 0",
        )
        .bind(id.value())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to decrement promo code usage: {}", e),
            )
        })?;

        Ok(result.rows_affected() > 0)
    }
}
