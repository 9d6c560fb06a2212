//! Landmarket Backend Library
//!
//! This library exports the core modules for the landmarket backend
//! server: the listing query engine, the payment/installment ledger and
//! the HTTP surface on top of them.

pub mod app_state;
pub mod gateway;
pub mod handlers;
pub mod ledger;
pub mod listings;
pub mod models;
pub mod routes;
pub mod store;
