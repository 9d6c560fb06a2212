//! API handlers for the landmarket backend

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app_state::AppState;
use crate::ledger::{LedgerError, PaymentFilter, PlanSummary, Receipt};
use crate::listings::{LandsQueryParams, ListingQuery};
use crate::models::{
    ApiResponse, DateRange, Pagination, PaymentPlan, PaymentRecord, PropertyListing,
};

/// Response shape of `GET /api/lands`
#[derive(Debug, Serialize, Deserialize)]
pub struct LandsResponse {
    pub lands: Vec<PropertyListing>,
    pub pagination: Pagination,
}

// ===== Listing Handlers =====

/// Search, filter, sort and paginate listings.
///
/// No parameter combination produces an error response; malformed
/// values fall back to defaults.
pub async fn list_lands(
    State(app_state): State<AppState>,
    Query(params): Query<LandsQueryParams>,
) -> Json<LandsResponse> {
    let query = ListingQuery::from_params(&params);
    let result = app_state.listing_service.search(&query);
    Json(LandsResponse {
        lands: result.items,
        pagination: result.pagination,
    })
}

/// Get a single listing by ID
pub async fn get_land(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<PropertyListing>>, (StatusCode, Json<ApiResponse<PropertyListing>>)> {
    match app_state.listing_service.get(id) {
        Some(listing) => Ok(Json(ApiResponse {
            success: true,
            data: Some(listing),
            error: None,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some("Listing not found".to_string()),
            }),
        )),
    }
}

// ===== Plan Handlers =====

/// Plan together with its derived summary
#[derive(Debug, Serialize)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: PaymentPlan,
    #[serde(flatten)]
    pub summary: PlanSummary,
}

/// Get a payment plan with paid/remaining amounts and the next due
/// installment
pub async fn get_plan(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<PlanView>>, (StatusCode, Json<ApiResponse<PlanView>>)> {
    match app_state.ledger_service.get_plan(id) {
        Some((plan, summary)) => Ok(Json(ApiResponse {
            success: true,
            data: Some(PlanView { plan, summary }),
            error: None,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some("Plan not found".to_string()),
            }),
        )),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayInstallmentRequest {
    pub installment_id: u64,
    #[validate(length(min = 1, message = "payment method is required"))]
    pub payment_method: String,
}

/// Pay one installment of a plan
pub async fn pay_installment(
    State(app_state): State<AppState>,
    Path(plan_id): Path<u64>,
    Json(request): Json<PayInstallmentRequest>,
) -> Result<Json<ApiResponse<PaymentRecord>>, (StatusCode, Json<ApiResponse<PaymentRecord>>)> {
    if let Err(e) = request.validate() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Validation error: {e}"),
        ));
    }

    match app_state.ledger_service.pay_installment(
        plan_id,
        request.installment_id,
        &request.payment_method,
    ) {
        Ok((_plan, record)) => Ok(Json(ApiResponse {
            success: true,
            data: Some(record),
            error: None,
        })),
        Err(e) => Err(error_response(ledger_status(&e), e.to_string())),
    }
}

// ===== Payment History Handlers =====

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryQuery {
    pub property_id: Option<u64>,
    pub date_range: Option<String>,
    pub status: Option<String>,
}

/// List payment records matching the filter
pub async fn list_payments(
    State(app_state): State<AppState>,
    Query(query): Query<PaymentHistoryQuery>,
) -> Json<ApiResponse<Vec<PaymentRecord>>> {
    let filter = PaymentFilter {
        property_id: query.property_id,
        date_range: query
            .date_range
            .as_deref()
            .map(DateRange::parse)
            .unwrap_or_default(),
        status: query.status,
    };
    let records = app_state.ledger_service.filter_payments(&filter);
    Json(ApiResponse {
        success: true,
        data: Some(records),
        error: None,
    })
}

/// Get the receipt for a payment record
pub async fn get_receipt(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ApiResponse<Receipt>>, (StatusCode, Json<ApiResponse<Receipt>>)> {
    match app_state.ledger_service.receipt_for(id) {
        Some(receipt) => Ok(Json(ApiResponse {
            success: true,
            data: Some(receipt),
            error: None,
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some("Payment record not found".to_string()),
            }),
        )),
    }
}

fn ledger_status(error: &LedgerError) -> StatusCode {
    match error {
        LedgerError::NotFound => StatusCode::NOT_FOUND,
        LedgerError::AlreadyPaid => StatusCode::CONFLICT,
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::Gateway(_) => StatusCode::BAD_GATEWAY,
    }
}

fn error_response<T>(status: StatusCode, message: String) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
}
