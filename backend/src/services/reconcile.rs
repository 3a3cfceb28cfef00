//! Stock reconciliation service
//!
//! Corrective writes for products whose manual stock violates the variant
//! rule. Every correction goes through the movement ledger entry point, so
//! the quantity rewrite and its compensating ledger entry commit together.
//! Both entry points are idempotent: a consistent catalog yields no writes.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::MovementType;

use crate::error::{AppError, AppResult};
use crate::services::audit::AuditService;
use crate::services::movement::{ApplyMovementInput, MovementService};

/// Knobs for a bulk sync run
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Flagged products processed per batch
    pub batch_size: usize,
    /// Consecutive failures before the run stops early
    pub max_consecutive_errors: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_consecutive_errors: 5,
        }
    }
}

/// Reconciliation service
#[derive(Clone)]
pub struct ReconcileService {
    db: PgPool,
    movements: MovementService,
    audits: AuditService,
    options: SyncOptions,
}

/// Outcome of one product in a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Updated,
    Skipped,
    Error,
}

/// Per-product sync result
#[derive(Debug, Serialize)]
pub struct SyncDetail {
    pub product_id: Uuid,
    pub name: String,
    pub status: SyncStatus,
    pub before: Option<i32>,
    pub after: Option<i32>,
    pub message: String,
}

/// Summary of a sync run
#[derive(Debug, Serialize)]
pub struct SyncReport {
    /// Correlation id written to every ledger entry of this run
    pub reference: String,
    pub total: i64,
    pub updated: i64,
    pub skipped: i64,
    pub errors: i64,
    pub details: Vec<SyncDetail>,
}

/// Row for the fresh per-product read
#[derive(Debug, FromRow)]
struct SyncTargetRow {
    name: String,
    manual_stock: i32,
    variant_count: i64,
}

impl ReconcileService {
    /// Create a new ReconcileService instance
    pub fn new(
        db: PgPool,
        movements: MovementService,
        audits: AuditService,
        options: SyncOptions,
    ) -> Self {
        Self {
            db,
            movements,
            audits,
            options,
        }
    }

    /// Reconcile a single product
    pub async fn sync_single(&self, actor: Option<Uuid>, product_id: Uuid) -> AppResult<SyncReport> {
        let reference = new_sync_reference();
        let detail = self.sync_one(actor, product_id, &reference).await?;
        Ok(summarize(reference, vec![detail]))
    }

    /// Reconcile every product flagged by a fresh scan
    ///
    /// One product per transaction; a failed product is recorded and the run
    /// continues, stopping early only after repeated consecutive failures.
    pub async fn sync_all(&self, actor: Option<Uuid>) -> AppResult<SyncReport> {
        let reference = new_sync_reference();
        let scan = self.audits.analyze().await?;
        let flagged = scan.inconsistent_products;

        tracing::info!(
            reference = %reference,
            flagged = flagged.len(),
            "starting catalog stock sync"
        );

        let mut details: Vec<SyncDetail> = Vec::with_capacity(flagged.len());
        let mut consecutive_errors = 0usize;
        let mut stopped_early = false;

        'batches: for batch in flagged.chunks(self.options.batch_size.max(1)) {
            for product in batch {
                match self.sync_one(actor, product.product_id, &reference).await {
                    Ok(detail) => {
                        consecutive_errors = 0;
                        details.push(detail);
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        tracing::error!(
                            product_id = %product.product_id,
                            error = %e,
                            "failed to sync product"
                        );
                        details.push(SyncDetail {
                            product_id: product.product_id,
                            name: product.name.clone(),
                            status: SyncStatus::Error,
                            before: Some(product.manual_stock),
                            after: None,
                            message: e.to_string(),
                        });
                        if consecutive_errors >= self.options.max_consecutive_errors.max(1) {
                            tracing::warn!(
                                reference = %reference,
                                consecutive_errors,
                                "stopping sync run early after repeated failures"
                            );
                            stopped_early = true;
                            break 'batches;
                        }
                    }
                }
            }
        }

        if stopped_early {
            for product in flagged.iter().skip(details.len()) {
                details.push(SyncDetail {
                    product_id: product.product_id,
                    name: product.name.clone(),
                    status: SyncStatus::Skipped,
                    before: Some(product.manual_stock),
                    after: None,
                    message: "not processed, run stopped early".to_string(),
                });
            }
        }

        let report = summarize(reference, details);
        tracing::info!(
            reference = %report.reference,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors,
            "catalog stock sync finished"
        );

        Ok(report)
    }

    /// Reconcile one product against a fresh read
    ///
    /// The correction itself re-reads and locks the row inside the ledger
    /// transaction, which narrows (but cannot close) the race window against
    /// concurrent order fulfillment.
    async fn sync_one(
        &self,
        actor: Option<Uuid>,
        product_id: Uuid,
        reference: &str,
    ) -> AppResult<SyncDetail> {
        let target = sqlx::query_as::<_, SyncTargetRow>(
            r#"
            SELECT p.name, p.manual_stock, COUNT(v.id) AS variant_count
            FROM products p
            LEFT JOIN variants v ON v.product_id = p.id
            WHERE p.id = $1
            GROUP BY p.id, p.name, p.manual_stock
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if target.variant_count == 0 {
            // manual stock is authoritative, never touched
            return Ok(SyncDetail {
                product_id,
                name: target.name,
                status: SyncStatus::Skipped,
                before: Some(target.manual_stock),
                after: Some(target.manual_stock),
                message: "no variants, manual stock is authoritative".to_string(),
            });
        }

        if target.manual_stock == 0 {
            return Ok(SyncDetail {
                product_id,
                name: target.name,
                status: SyncStatus::Skipped,
                before: Some(0),
                after: Some(0),
                message: "already consistent".to_string(),
            });
        }

        let receipt = self
            .movements
            .apply_movement(
                actor,
                ApplyMovementInput {
                    product_id,
                    variant_id: None,
                    movement_type: MovementType::Adjustment,
                    quantity: 0,
                    reason: Some("auto-sync".to_string()),
                    reference: Some(reference.to_string()),
                },
            )
            .await?;

        Ok(SyncDetail {
            product_id,
            name: target.name,
            status: SyncStatus::Updated,
            before: Some(receipt.movement.old_value),
            after: Some(receipt.movement.new_value),
            message: format!(
                "manual stock reset from {} to 0",
                receipt.movement.old_value
            ),
        })
    }
}

fn new_sync_reference() -> String {
    format!("sync-{}", Uuid::new_v4())
}

fn summarize(reference: String, details: Vec<SyncDetail>) -> SyncReport {
    let mut updated = 0i64;
    let mut skipped = 0i64;
    let mut errors = 0i64;
    for detail in &details {
        match detail.status {
            SyncStatus::Updated => updated += 1,
            SyncStatus::Skipped => skipped += 1,
            SyncStatus::Error => errors += 1,
        }
    }

    SyncReport {
        reference,
        total: details.len() as i64,
        updated,
        skipped,
        errors,
        details,
    }
}
