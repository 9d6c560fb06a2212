//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::ledger::LedgerService;
use crate::listings::ListingService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<ListingService>,
    pub ledger_service: Arc<LedgerService>,
}

impl AppState {
    pub fn new(listing_service: Arc<ListingService>, ledger_service: Arc<LedgerService>) -> Self {
        Self {
            listing_service,
            ledger_service,
        }
    }
}

impl FromRef<AppState> for Arc<ListingService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.listing_service.clone()
    }
}

impl FromRef<AppState> for Arc<LedgerService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.ledger_service.clone()
    }
}
