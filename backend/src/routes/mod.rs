//! Route definitions for the E-Commerce Admin Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - stock consistency engine
        .nest("/stock", stock_routes())
}

/// Stock engine routes (protected)
fn stock_routes() -> Router<AppState> {
    Router::new()
        // Movement ledger
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        // Consistency audit and reconciliation
        .route("/consistency", get(handlers::analyze_inconsistencies))
        .route("/consistency/sync", post(handlers::sync_all))
        .route("/consistency/sync/:product_id", post(handlers::sync_product))
        // Dashboard snapshot
        .route("/snapshot", get(handlers::get_inventory_snapshot))
        .route_layer(middleware::from_fn(auth_middleware))
}
