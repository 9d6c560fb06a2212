//! Landmarket Backend Server
//!
//! HTTP backend for a real-estate marketing and transaction site:
//! property listing queries and a mocked payment/installment ledger,
//! both behind in-memory stores seeded at startup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod app_state;
mod gateway;
mod handlers;
mod ledger;
mod listings;
mod models;
mod routes;
mod store;

use app_state::AppState;
use gateway::MockGateway;
use ledger::LedgerService;
use listings::ListingService;
use store::{InMemoryListingStore, InMemoryPaymentStore, InMemoryPlanStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Seed the in-memory stores
    let listing_store = Arc::new(InMemoryListingStore::new(store::seed_listings()));
    let plan_store = Arc::new(InMemoryPlanStore::new(store::seed_plans()));
    let payment_store = Arc::new(InMemoryPaymentStore::new());
    tracing::info!("In-memory stores seeded");

    // Initialize services
    let listing_service = Arc::new(ListingService::new(listing_store.clone()));
    let ledger_service = Arc::new(LedgerService::new(
        plan_store,
        payment_store,
        listing_store,
        Arc::new(MockGateway),
    ));

    // Create shared app state
    let app_state = AppState::new(listing_service, ledger_service);

    // Create the app router
    let app = routes::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors());

    // Get port from environment or default to 3001
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse()
        .context("PORT must be a number")?;

    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn configure_cors() -> CorsLayer {
    let allowed_origins_str = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    if allowed_origins_str.is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins_str
        .split(',')
        .map(|s| s.trim().parse().expect("Invalid CORS origin"))
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
