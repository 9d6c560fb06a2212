//! Route definitions for the landmarket API

use axum::{routing::get, Router};

use crate::app_state::AppState;
use crate::handlers::*;

// Listing routes
pub fn land_routes() -> Router<AppState> {
    Router::new()
        .route("/api/lands", get(list_lands))
        .route("/api/lands/:id", get(get_land))
}

// Payment plan routes
pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/api/plans/:id", get(get_plan))
        .route("/api/plans/:id/payments", axum::routing::post(pay_installment))
}

// Payment history routes
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments", get(list_payments))
        .route("/api/payments/:id/receipt", get(get_receipt))
}

/// Full API router, shared by the binary and the integration tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(land_routes())
        .merge(plan_routes())
        .merge(payment_routes())
        .with_state(state)
}

async fn root() -> &'static str {
    "Landmarket API Server"
}

async fn health_check() -> &'static str {
    "OK"
}
