//! Data models for the landmarket backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Property listing model
///
/// `size` is the human-readable label ("500 m²"); `size_value` is the
/// normalized numeric area in the same unit and is the only field used
/// for size-bucket filtering.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: u64,
    pub title: String,
    pub location: String,
    pub price: i64,
    pub size: String,
    pub size_value: f64,
    pub created_at: DateTime<Utc>,
}

/// Payment plan model
///
/// Installments are kept ordered by due date ascending. Paid/remaining
/// amounts and the overall status are derived, never stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPlan {
    pub id: u64,
    pub property_id: u64,
    pub total_amount: i64,
    pub installments: Vec<Installment>,
}

/// One scheduled partial payment within a plan
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: u64,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub status: InstallmentStatus,
}

/// Installment status: Due transitions to Paid exactly once, never back
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentStatus {
    Due,
    Paid,
}

/// Overall plan status, derived from the installments
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
}

/// Ledger entry created when an installment is paid
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: u64,
    pub plan_id: u64,
    pub installment_id: u64,
    pub property_id: u64,
    pub property_title: String,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub status: RecordStatus,
    pub payment_method: String,
    pub transaction_id: String,
    pub receipt_url: String,
}

/// Payment record status
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Completed,
    Pending,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "Completed",
            RecordStatus::Pending => "Pending",
            RecordStatus::Failed => "Failed",
        }
    }
}

/// Named area ranges used to coarsely filter listings by `size_value`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBucket {
    #[default]
    Any,
    /// < 300
    Small,
    /// [300, 500)
    Medium,
    /// [500, 1000)
    Large,
    /// >= 1000
    Xlarge,
}

impl SizeBucket {
    /// Unknown values fall back to `Any`, matching the permissive
    /// query contract.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "small" => SizeBucket::Small,
            "medium" => SizeBucket::Medium,
            "large" => SizeBucket::Large,
            "xlarge" => SizeBucket::Xlarge,
            _ => SizeBucket::Any,
        }
    }

    pub fn contains(&self, size_value: f64) -> bool {
        match self {
            SizeBucket::Any => true,
            SizeBucket::Small => size_value < 300.0,
            SizeBucket::Medium => (300.0..500.0).contains(&size_value),
            SizeBucket::Large => (500.0..1000.0).contains(&size_value),
            SizeBucket::Xlarge => size_value >= 1000.0,
        }
    }
}

/// Listing sort keys; unknown values silently default to `Newest`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    SizeAsc,
    SizeDesc,
}

impl SortKey {
    pub fn parse(value: &str) -> Self {
        match value {
            "priceAsc" => SortKey::PriceAsc,
            "priceDesc" => SortKey::PriceDesc,
            "sizeAsc" => SortKey::SizeAsc,
            "sizeDesc" => SortKey::SizeDesc,
            _ => SortKey::Newest,
        }
    }
}

/// Payment-history date windows, relative to now; lower bound inclusive,
/// no upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Last30Days,
    Last3Months,
    Last6Months,
    LastYear,
}

impl DateRange {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "last30days" => DateRange::Last30Days,
            "last3months" => DateRange::Last3Months,
            "last6months" => DateRange::Last6Months,
            "lastyear" => DateRange::LastYear,
            _ => DateRange::All,
        }
    }

    /// Earliest timestamp admitted by the window, or `None` for `All`.
    ///
    /// Month-named windows use calendar arithmetic, so "last3months"
    /// from July 1 starts on April 1 regardless of month lengths.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let months = match self {
            DateRange::All => return None,
            DateRange::Last30Days => return Some(now - chrono::Duration::days(30)),
            DateRange::Last3Months => 3,
            DateRange::Last6Months => 6,
            DateRange::LastYear => 12,
        };
        Some(
            now.checked_sub_months(chrono::Months::new(months))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        )
    }
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Pagination metadata attached to listing pages
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}
