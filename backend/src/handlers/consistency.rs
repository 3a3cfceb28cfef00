//! HTTP handlers for stock consistency endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::audit::{AuditService, ConsistencyReport};
use crate::services::movement::MovementService;
use crate::services::reconcile::{ReconcileService, SyncOptions, SyncReport};
use crate::AppState;

/// Report products whose stored manual stock violates the variant rule
pub async fn analyze_inconsistencies(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<ConsistencyReport>> {
    let service = AuditService::new(state.db);
    let report = service.analyze().await?;
    Ok(Json(report))
}

/// Reconcile the whole catalog
pub async fn sync_all(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<SyncReport>> {
    current_user.0.require("stock", "sync")?;

    let report = reconcile_service(&state)
        .sync_all(Some(current_user.0.user_id))
        .await?;
    Ok(Json(report))
}

/// Reconcile a single product
pub async fn sync_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<SyncReport>> {
    current_user.0.require("stock", "sync")?;

    let report = reconcile_service(&state)
        .sync_single(Some(current_user.0.user_id), product_id)
        .await?;
    Ok(Json(report))
}

fn reconcile_service(state: &AppState) -> ReconcileService {
    let movements = MovementService::new(state.db.clone(), state.config.stock.overdraw_policy);
    let audits = AuditService::new(state.db.clone());
    ReconcileService::new(
        state.db.clone(),
        movements,
        audits,
        SyncOptions {
            batch_size: state.config.stock.sync_batch_size as usize,
            max_consecutive_errors: state.config.stock.sync_max_consecutive_errors as usize,
        },
    )
}
