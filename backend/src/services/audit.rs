//! Consistency audit service
//!
//! Read-only scan over the catalog for products whose stored manual stock
//! violates the variant rule. The report is a point-in-time snapshot and may
//! be stale by the time a caller acts on it; it must not be treated as a lock.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::manual_stock_violation;

use crate::error::AppResult;

/// Consistency audit service
#[derive(Clone)]
pub struct AuditService {
    db: PgPool,
}

/// A product whose stored manual stock violates the variant rule
#[derive(Debug, Clone, Serialize)]
pub struct InconsistentProduct {
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    pub manual_stock: i32,
    pub variant_count: i64,
    pub variant_stock_sum: i64,
    pub issue: String,
}

/// Catalog-wide consistency report
#[derive(Debug, Serialize)]
pub struct ConsistencyReport {
    pub total: i64,
    pub with_variants: i64,
    pub with_inconsistencies: i64,
    pub needs_sync: bool,
    pub inconsistent_products: Vec<InconsistentProduct>,
}

/// Row for the audit scan query
#[derive(Debug, FromRow)]
struct AuditRow {
    id: Uuid,
    name: String,
    sku: String,
    manual_stock: i32,
    variant_count: i64,
    variant_stock_sum: i64,
}

impl AuditService {
    /// Create a new AuditService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Scan every tracked product for manual-stock violations
    pub async fn analyze(&self) -> AppResult<ConsistencyReport> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT p.id, p.name, p.sku, p.manual_stock,
                   COUNT(v.id) AS variant_count,
                   COALESCE(SUM(v.stock), 0)::BIGINT AS variant_stock_sum
            FROM products p
            LEFT JOIN variants v ON v.product_id = p.id
            WHERE p.track_stock
            GROUP BY p.id, p.name, p.sku, p.manual_stock
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let total = rows.len() as i64;
        let mut with_variants = 0i64;
        let mut inconsistent_products = Vec::new();

        for row in rows {
            if row.variant_count > 0 {
                with_variants += 1;
            }

            if manual_stock_violation(row.manual_stock, row.variant_count) {
                let issue = format!(
                    "manual stock is {} but {} variants hold {} units",
                    row.manual_stock, row.variant_count, row.variant_stock_sum
                );
                inconsistent_products.push(InconsistentProduct {
                    product_id: row.id,
                    name: row.name,
                    sku: row.sku,
                    manual_stock: row.manual_stock,
                    variant_count: row.variant_count,
                    variant_stock_sum: row.variant_stock_sum,
                    issue,
                });
            }
        }

        let with_inconsistencies = inconsistent_products.len() as i64;

        Ok(ConsistencyReport {
            total,
            with_variants,
            with_inconsistencies,
            needs_sync: with_inconsistencies > 0,
            inconsistent_products,
        })
    }
}
