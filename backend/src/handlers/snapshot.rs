//! HTTP handlers for the inventory dashboard snapshot

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::snapshot::{InventorySnapshot, SnapshotService};
use crate::AppState;

/// Catalog totals and recent ledger activity for the dashboard
pub async fn get_inventory_snapshot(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<InventorySnapshot>> {
    let service = SnapshotService::new(state.db, state.config.stock.recent_movements_limit);
    let snapshot = service.get_snapshot().await?;
    Ok(Json(snapshot))
}
