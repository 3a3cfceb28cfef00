//! Inventory snapshot service
//!
//! Catalog-wide totals for the dashboard, built entirely from the stock
//! aggregator plus a ledger read. Performs no writes and takes no locks; the
//! figures are an eventually-consistent read, not a transaction over the
//! whole catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{summarize_from_sums, MovementType, StockMovement, StockStatus};

use crate::error::{AppError, AppResult};

/// Inventory snapshot service
#[derive(Clone)]
pub struct SnapshotService {
    db: PgPool,
    recent_movements_limit: i64,
}

/// Dashboard snapshot of the whole catalog
#[derive(Debug, Serialize)]
pub struct InventorySnapshot {
    pub total_products: i64,
    pub total_stock: i64,
    pub total_value: Decimal,
    /// Low-stock products among those with `track_stock = true`
    pub low_stock_count: i64,
    /// Out-of-stock products among those with `track_stock = true`
    pub out_of_stock_count: i64,
    pub recent_movements: Vec<RecentMovement>,
}

/// A ledger entry joined with display names
#[derive(Debug, Serialize)]
pub struct RecentMovement {
    #[serde(flatten)]
    pub movement: StockMovement,
    pub product_name: String,
    pub variant_name: Option<String>,
}

/// Row for the per-product totals query
#[derive(Debug, FromRow)]
struct ProductTotalsRow {
    manual_stock: i32,
    low_stock_threshold: i32,
    track_stock: bool,
    price: Decimal,
    cost: Option<Decimal>,
    variant_count: i64,
    variant_stock_sum: i64,
}

/// Row for the recent movements query
#[derive(Debug, FromRow)]
struct RecentMovementRow {
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
    product_name: String,
    variant_name: Option<String>,
}

impl SnapshotService {
    /// Create a new SnapshotService instance
    pub fn new(db: PgPool, recent_movements_limit: u32) -> Self {
        Self {
            db,
            recent_movements_limit: recent_movements_limit as i64,
        }
    }

    /// Aggregate catalog totals and recent ledger activity
    pub async fn get_snapshot(&self) -> AppResult<InventorySnapshot> {
        let rows = sqlx::query_as::<_, ProductTotalsRow>(
            r#"
            SELECT p.manual_stock, p.low_stock_threshold, p.track_stock, p.price, p.cost,
                   COUNT(v.id) AS variant_count,
                   COALESCE(SUM(v.stock), 0)::BIGINT AS variant_stock_sum
            FROM products p
            LEFT JOIN variants v ON v.product_id = p.id
            GROUP BY p.id, p.manual_stock, p.low_stock_threshold, p.track_stock, p.price, p.cost
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let total_products = rows.len() as i64;
        let mut total_stock = 0i64;
        let mut total_value = Decimal::ZERO;
        let mut low_stock_count = 0i64;
        let mut out_of_stock_count = 0i64;

        for row in rows {
            let summary = summarize_from_sums(
                row.manual_stock,
                row.variant_count,
                row.variant_stock_sum,
                row.price,
                row.cost,
                row.low_stock_threshold,
            );

            total_stock += summary.total_stock;
            total_value += summary.stock_value;

            if row.track_stock {
                match summary.status {
                    StockStatus::LowStock => low_stock_count += 1,
                    StockStatus::OutOfStock => out_of_stock_count += 1,
                    StockStatus::InStock => {}
                }
            }
        }

        let recent_movements = self.recent_movements().await?;

        Ok(InventorySnapshot {
            total_products,
            total_stock,
            total_value,
            low_stock_count,
            out_of_stock_count,
            recent_movements,
        })
    }

    async fn recent_movements(&self) -> AppResult<Vec<RecentMovement>> {
        let rows = sqlx::query_as::<_, RecentMovementRow>(
            r#"
            SELECT m.id, m.product_id, m.variant_id, m.movement_type, m.quantity,
                   m.old_value, m.new_value, m.reason, m.reference, m.created_by, m.created_at,
                   p.name AS product_name, v.name AS variant_name
            FROM stock_movements m
            JOIN products p ON p.id = m.product_id
            LEFT JOIN variants v ON v.id = m.variant_id
            ORDER BY m.created_at DESC, m.id DESC
            LIMIT $1
            "#,
        )
        .bind(self.recent_movements_limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let movement_type = row.movement_type.parse::<MovementType>().map_err(|_| {
                    AppError::from(anyhow::anyhow!(
                        "invalid movement type in ledger: {}",
                        row.movement_type
                    ))
                })?;

                Ok(RecentMovement {
                    movement: StockMovement {
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
                    },
                    product_name: row.product_name,
                    variant_name: row.variant_name,
                })
            })
            .collect()
    }
}
