//! Order handlers.

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{PageParams, Pagination};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Query, State};
use backroom_metadata::models::{OrderFilter, OrderRow};
use backroom_metadata::repos::OrderRepo;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Statuses an order may move through.
const ORDER_STATUSES: &[&str] = &[
    "pending",
    "processing",
    "shipped",
    "delivered",
    "cancelled",
];

/// Order representation returned to clients.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerEmail")]
    pub customer_email: String,
    pub items: serde_json::Value,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub status: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl OrderResponse {
    pub(crate) fn from_row(row: &OrderRow) -> ApiResult<Self> {
        Ok(Self {
            id: row.order_id,
            order_number: row.order_number.clone(),
            user_id: row.user_id,
            customer_name: row.customer_name.clone(),
            customer_email: row.customer_email.clone(),
            items: serde_json::from_str(&row.items_json)
                .map_err(|e| ApiError::Internal(format!("corrupt order items: {e}")))?,
            total_amount: row.total_amount,
            status: row.status.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filter parameters for order listings; pagination comes in through a
/// separate [`PageParams`] extractor.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Paginated order listing response.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub data: Vec<OrderResponse>,
    pub pagination: Pagination,
}

fn status_filter(status: &Option<String>) -> Option<String> {
    status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "all")
        .map(str::to_string)
}

/// GET /api/orders - List orders with filters and pagination.
#[tracing::instrument(skip(state, page, query))]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(page): Query<PageParams>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<OrderListResponse>> {
    user.require_admin()?;

    let filter = OrderFilter {
        status: status_filter(&query.status),
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };

    let total = state.metadata.count_orders(&filter).await?;
    let rows = state
        .metadata
        .list_orders(&filter, page.offset(), page.limit())
        .await?;
    let data = rows
        .iter()
        .map(OrderResponse::from_row)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(OrderListResponse {
        data,
        pagination: Pagination::new(&page, total),
    }))
}

/// GET /api/orders/{id} - Fetch a single order.
#[tracing::instrument(skip(state), fields(order_id = %order_id))]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    user.require_admin()?;

    let row = state
        .metadata
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_string()))?;
    Ok(Json(OrderResponse::from_row(&row)?))
}

/// Status update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

/// PUT /api/orders/{id}/status - Update an order's status.
#[tracing::instrument(skip(state, body), fields(order_id = %order_id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<OrderResponse>> {
    user.require_admin()?;

    let status = body
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("status is required".to_string()))?;
    if !ORDER_STATUSES.contains(&status) {
        return Err(ApiError::BadRequest(format!(
            "invalid status: {status} (expected one of {})",
            ORDER_STATUSES.join(", ")
        )));
    }

    let now = OffsetDateTime::now_utc();
    let updated = state
        .metadata
        .update_order_status(order_id, status, now)
        .await?;
    if !updated {
        return Err(ApiError::NotFound("order not found".to_string()));
    }

    let row = state
        .metadata
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("order not found".to_string()))?;
    tracing::info!(order_id = %order_id, status = %status, "order status updated");
    Ok(Json(OrderResponse::from_row(&row)?))
}

/// Delete response.
#[derive(Debug, Serialize)]
pub struct DeleteOrderResponse {
    pub deleted: bool,
}

/// DELETE /api/orders/{id} - Delete an order.
#[tracing::instrument(skip(state), fields(order_id = %order_id))]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<DeleteOrderResponse>> {
    user.require_admin()?;

    let deleted = state.metadata.delete_order(order_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("order not found".to_string()));
    }
    Ok(Json(DeleteOrderResponse { deleted }))
}
