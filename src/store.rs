//! Storage ports and their in-memory implementations
//!
//! The services only see the traits; this build backs them with
//! `RwLock`-guarded vectors seeded at startup. A real deployment swaps
//! these for a database-backed implementation without touching the
//! services.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use crate::models::{
    Installment, InstallmentStatus, PaymentPlan, PaymentRecord, PropertyListing, RecordStatus,
};

/// Read-only access to the property collection
pub trait ListingStore: Send + Sync {
    fn list(&self) -> Vec<PropertyListing>;
    fn get(&self, id: u64) -> Option<PropertyListing>;
}

/// Payment-plan access; `with_plan_mut` runs the closure under the
/// store's write lock so concurrent mutators of one plan are serialized
/// here, at the storage layer.
pub trait PlanStore: Send + Sync {
    fn get(&self, id: u64) -> Option<PaymentPlan>;
    fn with_plan_mut(
        &self,
        id: u64,
        f: &mut dyn FnMut(&mut PaymentPlan),
    ) -> Option<PaymentPlan>;
}

/// Fields of a payment record the ledger supplies; the store allocates
/// the id and derives the receipt URL from it.
#[derive(Debug, Clone)]
pub struct NewPaymentRecord {
    pub plan_id: u64,
    pub installment_id: u64,
    pub property_id: u64,
    pub property_title: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub status: RecordStatus,
    pub payment_method: String,
    pub transaction_id: String,
}

/// Append-only payment history
pub trait PaymentStore: Send + Sync {
    fn append(&self, record: NewPaymentRecord) -> PaymentRecord;
    fn list(&self) -> Vec<PaymentRecord>;
    fn get(&self, id: u64) -> Option<PaymentRecord>;
}

/// In-memory listing store
pub struct InMemoryListingStore {
    listings: Vec<PropertyListing>,
}

impl InMemoryListingStore {
    pub fn new(listings: Vec<PropertyListing>) -> Self {
        Self { listings }
    }
}

impl ListingStore for InMemoryListingStore {
    fn list(&self) -> Vec<PropertyListing> {
        self.listings.clone()
    }

    fn get(&self, id: u64) -> Option<PropertyListing> {
        self.listings.iter().find(|l| l.id == id).cloned()
    }
}

/// In-memory plan store
pub struct InMemoryPlanStore {
    plans: RwLock<Vec<PaymentPlan>>,
}

impl InMemoryPlanStore {
    pub fn new(plans: Vec<PaymentPlan>) -> Self {
        Self {
            plans: RwLock::new(plans),
        }
    }
}

impl PlanStore for InMemoryPlanStore {
    fn get(&self, id: u64) -> Option<PaymentPlan> {
        self.plans
            .read()
            .expect("plan store lock poisoned")
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn with_plan_mut(
        &self,
        id: u64,
        f: &mut dyn FnMut(&mut PaymentPlan),
    ) -> Option<PaymentPlan> {
        let mut plans = self.plans.write().expect("plan store lock poisoned");
        let plan = plans.iter_mut().find(|p| p.id == id)?;
        f(plan);
        Some(plan.clone())
    }
}

/// In-memory payment history
pub struct InMemoryPaymentStore {
    records: RwLock<Vec<PaymentRecord>>,
    next_id: RwLock<u64>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: RwLock::new(1),
        }
    }
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn append(&self, record: NewPaymentRecord) -> PaymentRecord {
        let mut next_id = self.next_id.write().expect("payment id lock poisoned");
        let id = *next_id;
        *next_id += 1;
        drop(next_id);

        let stored = PaymentRecord {
            id,
            plan_id: record.plan_id,
            installment_id: record.installment_id,
            property_id: record.property_id,
            property_title: record.property_title,
            amount: record.amount,
            date: record.date,
            status: record.status,
            payment_method: record.payment_method,
            transaction_id: record.transaction_id,
            receipt_url: format!("/api/payments/{id}/receipt"),
        };
        self.records
            .write()
            .expect("payment store lock poisoned")
            .push(stored.clone());
        stored
    }

    fn list(&self) -> Vec<PaymentRecord> {
        self.records
            .read()
            .expect("payment store lock poisoned")
            .clone()
    }

    fn get(&self, id: u64) -> Option<PaymentRecord> {
        self.records
            .read()
            .expect("payment store lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

/// Demo listings seeded at startup
pub fn seed_listings() -> Vec<PropertyListing> {
    let now = Utc::now();
    let listing = |id: u64, title: &str, location: &str, price: i64, size_value: f64, days_ago: i64| {
        PropertyListing {
            id,
            title: title.to_string(),
            location: location.to_string(),
            price,
            size: format!("{size_value} m²"),
            size_value,
            created_at: now - Duration::days(days_ago),
        }
    };

    vec![
        listing(1, "Sunrise Valley Plot", "Riverside", 250_000, 500.0, 3),
        listing(2, "Cedar Hill Parcel", "Northgate", 180_000, 450.0, 12),
        listing(3, "Lakeview Estate Land", "Riverside", 320_000, 600.0, 7),
        listing(4, "Meadowbrook Lot", "Southfield", 95_000, 250.0, 30),
        listing(5, "Highland Terrace Plot", "Northgate", 410_000, 820.0, 1),
        listing(6, "Willow Creek Acreage", "Westbrook", 560_000, 1_200.0, 20),
        listing(7, "Stonebridge Corner Lot", "Southfield", 140_000, 330.0, 45),
        listing(8, "Harborview Parcel", "Eastport", 275_000, 480.0, 5),
    ]
}

/// Demo payment plans for the seeded listings
pub fn seed_plans() -> Vec<PaymentPlan> {
    let now = Utc::now();
    let installment = |id: u64, amount: i64, offset_days: i64, status: InstallmentStatus| {
        Installment {
            id,
            amount,
            date: now + Duration::days(offset_days),
            status,
        }
    };

    vec![
        PaymentPlan {
            id: 1,
            property_id: 1,
            total_amount: 250_000,
            installments: vec![
                installment(1, 100_000, -60, InstallmentStatus::Paid),
                installment(2, 75_000, -30, InstallmentStatus::Paid),
                installment(3, 75_000, 30, InstallmentStatus::Due),
            ],
        },
        PaymentPlan {
            id: 2,
            property_id: 3,
            total_amount: 320_000,
            installments: vec![
                installment(1, 80_000, 0, InstallmentStatus::Due),
                installment(2, 80_000, 30, InstallmentStatus::Due),
                installment(3, 80_000, 60, InstallmentStatus::Due),
                installment(4, 80_000, 90, InstallmentStatus::Due),
            ],
        },
    ]
}
