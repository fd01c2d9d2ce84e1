//! Payment handlers.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{PageParams, Pagination};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use backroom_metadata::models::{PaymentFilter, PaymentRow};
use backroom_metadata::repos::PaymentRepo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Statuses a payment may hold.
const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed", "refunded", "cancelled"];

/// Payment representation returned to clients.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    #[serde(rename = "paymentRef")]
    pub payment_ref: String,
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    pub amount: f64,
    pub method: String,
    pub status: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    pub gateway: String,
    pub fees: f64,
    #[serde(
        rename = "processedAt",
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub processed_at: Option<OffsetDateTime>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PaymentResponse {
    fn from_row(row: &PaymentRow) -> Self {
        Self {
            id: row.payment_id,
            payment_ref: row.payment_ref.clone(),
            order_id: row.order_id,
            user_id: row.user_id,
            amount: row.amount,
            method: row.method.clone(),
            status: row.status.clone(),
            transaction_id: row.transaction_id.clone(),
            gateway: row.gateway.clone(),
            fees: row.fees,
            processed_at: row.processed_at,
            created_at: row.created_at,
        }
    }
}

/// Filter parameters for payment listings; pagination comes in through
/// a separate [`PageParams`] extractor.
#[derive(Debug, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<String>,
    pub method: Option<String>,
    pub search: Option<String>,
}

/// Paginated payment listing response.
#[derive(Debug, Serialize)]
pub struct PaymentListResponse {
    pub data: Vec<PaymentResponse>,
    pub pagination: Pagination,
}

fn selective(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all")
        .map(str::to_string)
}

/// GET /api/payments - List payments with filters and pagination.
#[tracing::instrument(skip(state, page, query))]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageParams>,
    Query(query): Query<PaymentListQuery>,
) -> ApiResult<Json<PaymentListResponse>> {
    user.require_admin()?;

    let filter = PaymentFilter {
        status: selective(&query.status),
        method: selective(&query.method),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };

    let total = state.metadata.count_payments(&filter).await?;
    let rows = state
        .metadata
        .list_payments(&filter, page.offset(), page.limit())
        .await?;

    Ok(Json(PaymentListResponse {
        data: rows.iter().map(PaymentResponse::from_row).collect(),
        pagination: Pagination::new(&page, total),
    }))
}

/// GET /api/payments/{id} - Fetch a single payment.
#[tracing::instrument(skip(state), fields(payment_id = %payment_id))]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
) -> ApiResult<Json<PaymentResponse>> {
    user.require_admin()?;

    let row = state
        .metadata
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;
    Ok(Json(PaymentResponse::from_row(&row)))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub status: Option<String>,
}

/// PUT /api/payments/{id}/status - Update a payment's status.
///
/// Completing a payment records `processed_at`.
#[tracing::instrument(skip(state, body), fields(payment_id = %payment_id))]
pub async fn update_payment_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    user.require_admin()?;

    let status = body
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("status is required".to_string()))?;
    if !PAYMENT_STATUSES.contains(&status) {
        return Err(ApiError::BadRequest(format!(
            "invalid status: {status} (expected one of {})",
            PAYMENT_STATUSES.join(", ")
        )));
    }

    let now = OffsetDateTime::now_utc();
    let processed_at = (status == "completed").then_some(now);
    let updated = state
        .metadata
        .update_payment_status(payment_id, status, processed_at, now)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("payment not found".to_string()));
    }

    let row = state
        .metadata
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;
    tracing::info!(payment_id = %payment_id, status = %status, "payment status updated");
    Ok(Json(PaymentResponse::from_row(&row)))
}
