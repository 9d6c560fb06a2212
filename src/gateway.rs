//! Payment gateway port
//!
//! The ledger charges through this trait; the bundled implementation is
//! a mock that always approves. A real processor integration implements
//! the same trait and can surface declines and timeouts.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Result of a charge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Approved { transaction_id: String },
    Declined { reason: String },
    TimedOut,
}

pub trait PaymentGateway: Send + Sync {
    fn charge(&self, amount: i64, method: &str) -> GatewayOutcome;
}

/// Always-approving gateway used in development and tests
pub struct MockGateway;

impl PaymentGateway for MockGateway {
    fn charge(&self, amount: i64, method: &str) -> GatewayOutcome {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|c| (c as char).to_ascii_uppercase())
            .collect();
        let transaction_id = format!("TXN-{}-{}", chrono::Utc::now().timestamp_millis(), suffix);
        tracing::debug!(amount, method, %transaction_id, "mock gateway approved charge");
        GatewayOutcome::Approved { transaction_id }
    }
}
