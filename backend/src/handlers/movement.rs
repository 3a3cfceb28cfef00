//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::MovementType;
use shared::types::{DateRange, Pagination};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::movement::{ApplyMovementInput, MovementFilter, MovementReceipt, MovementService};
use crate::AppState;

/// Apply a stock movement (IN/OUT/ADJUSTMENT) to a product or variant
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ApplyMovementInput>,
) -> AppResult<Json<MovementReceipt>> {
    current_user.0.require("stock", "write")?;

    let service = MovementService::new(state.db, state.config.stock.overdraw_policy);
    let receipt = service
        .apply_movement(Some(current_user.0.user_id), input)
        .await?;
    Ok(Json(receipt))
}

/// Query parameters for listing movements
#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    pub product_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List ledger entries, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListMovementsQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let date_range = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => Some(DateRange { start, end }),
        (None, None) => None,
        _ => {
            return Err(AppError::ValidationError(
                "start_date and end_date must be provided together".to_string(),
            ))
        }
    };

    let filter = MovementFilter {
        product_id: query.product_id,
        variant_id: query.variant_id,
        movement_type: query.movement_type,
        date_range,
    };

    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let service = MovementService::new(state.db, state.config.stock.overdraw_policy);
    let page = service.list_movements(filter, pagination).await?;

    Ok(Json(serde_json::json!({
        "items": page.data,
        "pagination": page.pagination,
    })))
}
