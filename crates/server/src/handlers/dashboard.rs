//! Dashboard statistics handler.

use crate::auth::AuthenticatedUser;
use crate::error::ApiResult;
use crate::handlers::orders::OrderResponse;
use crate::handlers::products::ProductResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use backroom_metadata::models::{OrderFilter, PaymentFilter, ProductFilter};
use backroom_metadata::repos::{OrderRepo, PaymentRepo, ProductRepo, UserRepo};
use serde::Serialize;

/// Number of recent records shown on the dashboard.
const RECENT_LIMIT: i64 = 5;

/// Dashboard statistics response.
#[derive(Debug, Serialize)]
pub struct DashboardStatsResponse {
    #[serde(rename = "totalProducts")]
    pub total_products: i64,
    #[serde(rename = "totalUsers")]
    pub total_users: i64,
    #[serde(rename = "totalOrders")]
    pub total_orders: i64,
    #[serde(rename = "totalPayments")]
    pub total_payments: i64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
    #[serde(rename = "recentOrders")]
    pub recent_orders: Vec<OrderResponse>,
    #[serde(rename = "topProducts")]
    pub top_products: Vec<ProductResponse>,
}

/// GET /api/dashboard/stats - Aggregate counts for the admin dashboard.
#[tracing::instrument(skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<DashboardStatsResponse>> {
    user.require_admin()?;

    let total_products = state
        .metadata
        .count_products(&ProductFilter::default())
        .await?;
    let total_users = state.metadata.count_users().await?;
    let total_orders = state.metadata.count_orders(&OrderFilter::default()).await?;
    let total_payments = state
        .metadata
        .count_payments(&PaymentFilter::default())
        .await?;
    let total_revenue = state.metadata.total_revenue().await?;

    let recent_orders = state
        .metadata
        .recent_orders(RECENT_LIMIT)
        .await?
        .iter()
        .map(OrderResponse::from_row)
        .collect::<ApiResult<Vec<_>>>()?;

    let top_products = state
        .metadata
        .latest_products(RECENT_LIMIT)
        .await?
        .iter()
        .map(|row| ProductResponse::from_row(row))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(DashboardStatsResponse {
        total_products,
        total_users,
        total_orders,
        total_payments,
        total_revenue,
        recent_orders,
        top_products,
    }))
}
