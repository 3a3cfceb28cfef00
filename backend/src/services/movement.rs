//! Stock movement ledger service
//!
//! The single write path for every quantity change in the catalog. Each
//! movement locks the target row, applies the shared quantity rule, writes
//! the new quantity and appends the ledger row in one transaction. The
//! ledger is append-only; rows are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use shared::models::{apply_movement_rule, MovementType, OverdrawPolicy, StockMovement};
use shared::types::{DateRange, PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_movement_reason, validate_movement_reference};

use crate::error::{AppError, AppResult};

/// Movement ledger service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
    overdraw_policy: OverdrawPolicy,
}

/// Input for applying a stock movement
///
/// `quantity` is the movement magnitude for IN/OUT and the absolute target
/// quantity for ADJUSTMENT.
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyMovementInput {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

/// Result of applying a movement
#[derive(Debug, Serialize)]
pub struct MovementReceipt {
    pub movement: StockMovement,
    pub new_stock: i32,
}

/// Filter for listing movements
#[derive(Debug, Default)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub date_range: Option<DateRange>,
}

/// Row for movement queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    movement_type: String,
    quantity: i32,
    old_value: i32,
    new_value: i32,
    reason: Option<String>,
    reference: Option<String>,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(|_| anyhow::anyhow!("invalid movement type in ledger: {}", row.movement_type))?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            movement_type,
            quantity: row.quantity,
            old_value: row.old_value,
            new_value: row.new_value,
            reason: row.reason,
            reference: row.reference,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool, overdraw_policy: OverdrawPolicy) -> Self {
        Self {
            db,
            overdraw_policy,
        }
    }

    /// Apply a stock movement to a product's manual stock or a variant
    ///
    /// Atomic: the quantity write and the ledger row commit together or not
    /// at all. A store failure surfaces as a database error with no partial
    /// write; the caller may retry.
    pub async fn apply_movement(
        &self,
        actor: Option<Uuid>,
        input: ApplyMovementInput,
    ) -> AppResult<MovementReceipt> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_movement_reason(input.reason.as_deref())
            .map_err(|m| AppError::ValidationError(m.to_string()))?;
        validate_movement_reference(input.reference.as_deref())
            .map_err(|m| AppError::ValidationError(m.to_string()))?;

        let mut tx = self.db.begin().await?;

        // Lock the target row for the duration of the transaction
        let old_value = if let Some(variant_id) = input.variant_id {
            sqlx::query_scalar::<_, i32>(
                "SELECT stock FROM variants WHERE id = $1 AND product_id = $2 FOR UPDATE",
            )
            .bind(variant_id)
            .bind(input.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Variant".to_string()))?
        } else {
            sqlx::query_scalar::<_, i32>(
                "SELECT manual_stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(input.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?
        };

        let change =
            apply_movement_rule(old_value, input.movement_type, input.quantity, self.overdraw_policy)?;

        if let Some(variant_id) = input.variant_id {
            sqlx::query("UPDATE variants SET stock = $1, updated_at = NOW() WHERE id = $2")
                .bind(change.new_value)
                .bind(variant_id)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE products SET manual_stock = $1, updated_at = NOW() WHERE id = $2")
                .bind(change.new_value)
                .bind(input.product_id)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, MovementRow>(
            r#"
            INSERT INTO stock_movements (
                product_id, variant_id, movement_type, quantity, old_value, new_value,
                reason, reference, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, product_id, variant_id, movement_type, quantity, old_value, new_value,
                      reason, reference, created_by, created_at
            "#,
        )
        .bind(input.product_id)
        .bind(input.variant_id)
        .bind(input.movement_type.as_str())
        .bind(change.recorded_quantity)
        .bind(old_value)
        .bind(change.new_value)
        .bind(&input.reason)
        .bind(&input.reference)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            product_id = %input.product_id,
            variant_id = ?input.variant_id,
            movement_type = %input.movement_type,
            old_value,
            new_value = change.new_value,
            "stock movement applied"
        );

        Ok(MovementReceipt {
            movement: row.try_into()?,
            new_stock: change.new_value,
        })
    }

    /// List movements, newest first
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<StockMovement>> {
        let pagination = Pagination {
            page: pagination.page.max(1),
            per_page: pagination.per_page.clamp(1, 100),
        };

        let movement_type = filter.movement_type.map(|t| t.as_str());
        let start_date = filter.date_range.map(|r| r.start);
        let end_date = filter.date_range.map(|r| r.end);

        let total_items = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR variant_id = $2)
              AND ($3::text IS NULL OR movement_type = $3)
              AND ($4::date IS NULL OR created_at >= $4::date)
              AND ($5::date IS NULL OR created_at < $5::date + INTERVAL '1 day')
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.variant_id)
        .bind(movement_type)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, MovementRow>(
            r#"
            SELECT id, product_id, variant_id, movement_type, quantity, old_value, new_value,
                   reason, reference, created_by, created_at
            FROM stock_movements
            WHERE ($1::uuid IS NULL OR product_id = $1)
              AND ($2::uuid IS NULL OR variant_id = $2)
              AND ($3::text IS NULL OR movement_type = $3)
              AND ($4::date IS NULL OR created_at >= $4::date)
              AND ($5::date IS NULL OR created_at < $5::date + INTERVAL '1 day')
            ORDER BY created_at DESC, id DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(filter.product_id)
        .bind(filter.variant_id)
        .bind(movement_type)
        .bind(start_date)
        .bind(end_date)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(StockMovement::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(pagination, total_items as u64),
        })
    }
}
