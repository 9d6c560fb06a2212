//! Payment / installment ledger
//!
//! Models progress of a property purchase across installments and
//! records completed payments. `pay_installment` is the only mutating
//! operation; everything else is a pure function of the stored data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gateway::{GatewayOutcome, PaymentGateway};
use crate::models::{
    DateRange, Installment, InstallmentStatus, PaymentPlan, PaymentRecord, PlanStatus,
    RecordStatus,
};
use crate::store::{ListingStore, NewPaymentRecord, PaymentStore, PlanStore};

/// Ledger service error
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("plan or installment not found")]
    NotFound,
    #[error("installment is already paid")]
    AlreadyPaid,
    #[error("{0}")]
    Validation(String),
    #[error("payment gateway error: {0}")]
    Gateway(String),
}

/// Derived view of a plan's progress
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub payment_status: PlanStatus,
    pub next_due_installment: Option<Installment>,
}

/// Criteria for filtering the payment history; every provided field
/// must match.
#[derive(Debug, Default, Clone)]
pub struct PaymentFilter {
    pub property_id: Option<u64>,
    pub date_range: DateRange,
    pub status: Option<String>,
}

/// Printable receipt for a payment record
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_number: String,
    pub transaction_id: String,
    pub property_title: String,
    pub payment_method: String,
    pub amount: i64,
    pub processing_fee: i64,
    pub total: i64,
    pub date: DateTime<Utc>,
    pub status: RecordStatus,
}

/// Summarize a plan from its installment list.
///
/// `next_due_installment` is the earliest-dated Due installment, or
/// `None` once everything is paid. `paid + remaining == total` holds by
/// construction as long as the installment amounts sum to the total.
pub fn plan_summary(plan: &PaymentPlan) -> PlanSummary {
    let paid_amount: i64 = plan
        .installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid)
        .map(|i| i.amount)
        .sum();
    let remaining_amount = plan.total_amount - paid_amount;
    let next_due_installment = plan
        .installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Due)
        .min_by_key(|i| i.date)
        .cloned();

    PlanSummary {
        paid_amount,
        remaining_amount,
        payment_status: if remaining_amount == 0 {
            PlanStatus::Completed
        } else {
            PlanStatus::InProgress
        },
        next_due_installment,
    }
}

/// Filter records against the provided criteria, `now`-relative for the
/// date window. Status matching is case-insensitive on the filter value.
pub fn filter_records(
    records: &[PaymentRecord],
    filter: &PaymentFilter,
    now: DateTime<Utc>,
) -> Vec<PaymentRecord> {
    let cutoff = filter.date_range.cutoff(now);
    records
        .iter()
        .filter(|r| filter.property_id.map_or(true, |id| r.property_id == id))
        .filter(|r| cutoff.map_or(true, |c| r.date >= c))
        .filter(|r| {
            filter
                .status
                .as_deref()
                .map_or(true, |s| r.status.as_str().eq_ignore_ascii_case(s))
        })
        .cloned()
        .collect()
}

/// Build the receipt view for a record. Receipt numbers zero-pad the
/// record id to six digits; the processing fee is fixed at zero in this
/// model.
pub fn receipt(record: &PaymentRecord) -> Receipt {
    Receipt {
        receipt_number: format!("REC-{:06}", record.id),
        transaction_id: record.transaction_id.clone(),
        property_title: record.property_title.clone(),
        payment_method: record.payment_method.clone(),
        amount: record.amount,
        processing_fee: 0,
        total: record.amount,
        date: record.date,
        status: record.status,
    }
}

/// Ledger service backed by the injected stores and gateway
pub struct LedgerService {
    plans: Arc<dyn PlanStore>,
    payments: Arc<dyn PaymentStore>,
    listings: Arc<dyn ListingStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl LedgerService {
    pub fn new(
        plans: Arc<dyn PlanStore>,
        payments: Arc<dyn PaymentStore>,
        listings: Arc<dyn ListingStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            plans,
            payments,
            listings,
            gateway,
        }
    }

    /// Fetch a plan together with its derived summary.
    pub fn get_plan(&self, plan_id: u64) -> Option<(PaymentPlan, PlanSummary)> {
        let plan = self.plans.get(plan_id)?;
        let summary = plan_summary(&plan);
        Some((plan, summary))
    }

    /// Pay one installment of a plan through the gateway.
    ///
    /// # Errors
    /// `NotFound` for an unknown plan or installment, `AlreadyPaid` if
    /// the installment was settled before, `Validation` for an empty
    /// payment method, `Gateway` when the charge is declined or times
    /// out. On every error path the plan is left untouched.
    pub fn pay_installment(
        &self,
        plan_id: u64,
        installment_id: u64,
        method: &str,
    ) -> Result<(PaymentPlan, PaymentRecord), LedgerError> {
        if method.trim().is_empty() {
            return Err(LedgerError::Validation(
                "payment method is required".to_string(),
            ));
        }

        // The store runs the closure under its write lock, so the
        // read-modify-write on the installment status is serialized.
        let mut outcome: Result<(Installment, String), LedgerError> = Err(LedgerError::NotFound);
        let updated = self.plans.with_plan_mut(plan_id, &mut |plan| {
            let installment = match plan
                .installments
                .iter_mut()
                .find(|i| i.id == installment_id)
            {
                Some(installment) => installment,
                None => {
                    outcome = Err(LedgerError::NotFound);
                    return;
                }
            };
            if installment.status == InstallmentStatus::Paid {
                outcome = Err(LedgerError::AlreadyPaid);
                return;
            }
            match self.gateway.charge(installment.amount, method) {
                GatewayOutcome::Approved { transaction_id } => {
                    installment.status = InstallmentStatus::Paid;
                    outcome = Ok((installment.clone(), transaction_id));
                }
                GatewayOutcome::Declined { reason } => {
                    outcome = Err(LedgerError::Gateway(reason));
                }
                GatewayOutcome::TimedOut => {
                    outcome = Err(LedgerError::Gateway("charge timed out".to_string()));
                }
            }
        });

        let plan = updated.ok_or(LedgerError::NotFound)?;
        let (installment, transaction_id) = outcome?;

        let property_title = self
            .listings
            .get(plan.property_id)
            .map(|l| l.title)
            .unwrap_or_else(|| "Unknown property".to_string());

        let record = self.payments.append(NewPaymentRecord {
            plan_id: plan.id,
            installment_id: installment.id,
            property_id: plan.property_id,
            property_title,
            amount: installment.amount,
            date: Utc::now(),
            status: RecordStatus::Completed,
            payment_method: method.to_string(),
            transaction_id,
        });

        tracing::info!(
            plan_id,
            installment_id,
            amount = record.amount,
            transaction_id = %record.transaction_id,
            "installment paid"
        );

        Ok((plan, record))
    }

    /// Payment history matching the filter.
    pub fn filter_payments(&self, filter: &PaymentFilter) -> Vec<PaymentRecord> {
        filter_records(&self.payments.list(), filter, Utc::now())
    }

    /// Receipt for a single payment record.
    pub fn receipt_for(&self, record_id: u64) -> Option<Receipt> {
        self.payments.get(record_id).map(|r| receipt(&r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::store::{InMemoryListingStore, InMemoryPaymentStore, InMemoryPlanStore};
    use chrono::Duration;

    struct DecliningGateway;

    impl PaymentGateway for DecliningGateway {
        fn charge(&self, _amount: i64, _method: &str) -> GatewayOutcome {
            GatewayOutcome::Declined {
                reason: "insufficient funds".to_string(),
            }
        }
    }

    fn test_plan() -> PaymentPlan {
        let now = Utc::now();
        PaymentPlan {
            id: 1,
            property_id: 1,
            total_amount: 300,
            installments: vec![
                Installment {
                    id: 1,
                    amount: 100,
                    date: now - Duration::days(30),
                    status: InstallmentStatus::Paid,
                },
                Installment {
                    id: 2,
                    amount: 100,
                    date: now,
                    status: InstallmentStatus::Due,
                },
                Installment {
                    id: 3,
                    amount: 100,
                    date: now + Duration::days(30),
                    status: InstallmentStatus::Due,
                },
            ],
        }
    }

    fn service_with(
        plan: PaymentPlan,
        gateway: Arc<dyn PaymentGateway>,
    ) -> (LedgerService, Arc<InMemoryPlanStore>) {
        let plans = Arc::new(InMemoryPlanStore::new(vec![plan]));
        let listings = Arc::new(InMemoryListingStore::new(crate::store::seed_listings()));
        let payments = Arc::new(InMemoryPaymentStore::new());
        let service = LedgerService::new(plans.clone(), payments, listings, gateway);
        (service, plans)
    }

    #[test]
    fn summary_accounts_for_every_installment() {
        let summary = plan_summary(&test_plan());
        assert_eq!(summary.paid_amount, 100);
        assert_eq!(summary.remaining_amount, 200);
        assert_eq!(summary.payment_status, PlanStatus::InProgress);
        assert_eq!(summary.next_due_installment.unwrap().id, 2);
    }

    #[test]
    fn paying_advances_next_due_and_keeps_amounts_balanced() {
        let (service, _) = service_with(test_plan(), Arc::new(MockGateway));
        let (plan, record) = service.pay_installment(1, 2, "credit_card").unwrap();

        assert_eq!(record.status, RecordStatus::Completed);
        assert_eq!(record.amount, 100);
        assert!(record.transaction_id.starts_with("TXN-"));

        let summary = plan_summary(&plan);
        assert_eq!(summary.paid_amount + summary.remaining_amount, plan.total_amount);
        assert_eq!(summary.next_due_installment.unwrap().id, 3);
    }

    #[test]
    fn paying_the_last_installment_completes_the_plan() {
        let (service, _) = service_with(test_plan(), Arc::new(MockGateway));
        service.pay_installment(1, 2, "bank_transfer").unwrap();
        let (plan, _) = service.pay_installment(1, 3, "bank_transfer").unwrap();

        let summary = plan_summary(&plan);
        assert_eq!(summary.payment_status, PlanStatus::Completed);
        assert_eq!(summary.remaining_amount, 0);
        assert!(summary.next_due_installment.is_none());
    }

    #[test]
    fn double_payment_fails_and_leaves_the_plan_unchanged() {
        let (service, plans) = service_with(test_plan(), Arc::new(MockGateway));
        let err = service.pay_installment(1, 1, "credit_card").unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyPaid));

        let plan = plans.get(1).unwrap();
        assert_eq!(plan_summary(&plan).paid_amount, 100);
    }

    #[test]
    fn unknown_plan_and_installment_are_not_found() {
        let (service, _) = service_with(test_plan(), Arc::new(MockGateway));
        assert!(matches!(
            service.pay_installment(99, 1, "credit_card"),
            Err(LedgerError::NotFound)
        ));
        assert!(matches!(
            service.pay_installment(1, 99, "credit_card"),
            Err(LedgerError::NotFound)
        ));
    }

    #[test]
    fn empty_method_is_a_validation_error() {
        let (service, _) = service_with(test_plan(), Arc::new(MockGateway));
        assert!(matches!(
            service.pay_installment(1, 2, "  "),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn declined_charge_leaves_the_installment_due() {
        let (service, plans) = service_with(test_plan(), Arc::new(DecliningGateway));
        let err = service.pay_installment(1, 2, "credit_card").unwrap_err();
        assert!(matches!(err, LedgerError::Gateway(_)));

        let plan = plans.get(1).unwrap();
        let installment = plan.installments.iter().find(|i| i.id == 2).unwrap();
        assert_eq!(installment.status, InstallmentStatus::Due);
    }

    #[test]
    fn payment_filter_matches_all_provided_criteria() {
        let now = Utc::now();
        let record = |id: u64, property_id: u64, days_ago: i64, status: RecordStatus| PaymentRecord {
            id,
            plan_id: 1,
            installment_id: id,
            property_id,
            property_title: "Plot".to_string(),
            amount: 100,
            date: now - Duration::days(days_ago),
            status,
            payment_method: "credit_card".to_string(),
            transaction_id: format!("TXN-{id}"),
            receipt_url: format!("/api/payments/{id}/receipt"),
        };
        let records = vec![
            record(1, 1, 5, RecordStatus::Completed),
            record(2, 1, 120, RecordStatus::Completed),
            record(3, 2, 10, RecordStatus::Failed),
        ];

        // case-insensitive status
        let by_status = filter_records(
            &records,
            &PaymentFilter {
                status: Some("completed".to_string()),
                ..Default::default()
            },
            now,
        );
        assert_eq!(by_status.len(), 2);
        assert!(by_status.iter().all(|r| r.status == RecordStatus::Completed));

        // inclusive lower bound, no upper bound
        let recent = filter_records(
            &records,
            &PaymentFilter {
                date_range: DateRange::Last30Days,
                ..Default::default()
            },
            now,
        );
        assert_eq!(recent.len(), 2);

        let combined = filter_records(
            &records,
            &PaymentFilter {
                property_id: Some(1),
                date_range: DateRange::Last3Months,
                status: Some("COMPLETED".to_string()),
            },
            now,
        );
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id, 1);
    }

    #[test]
    fn receipt_zero_pads_the_record_id() {
        let (service, _) = service_with(test_plan(), Arc::new(MockGateway));
        let (_, record) = service.pay_installment(1, 2, "credit_card").unwrap();
        let receipt = service.receipt_for(record.id).unwrap();

        assert_eq!(receipt.receipt_number, format!("REC-{:06}", record.id));
        assert!(receipt.receipt_number.starts_with("REC-00000"));
        assert_eq!(receipt.processing_fee, 0);
        assert_eq!(receipt.total, receipt.amount);
    }
}
