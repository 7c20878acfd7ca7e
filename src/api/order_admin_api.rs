//! 订单导出与归档清理 API
//!
//! 导出响应里回显本次筛选条件，客户端原样保存作为清理凭证；
//! 清理请求同时带上请求条件与上次导出条件，两者逐字段一致才执行，
//! 成功响应置 clear_export_token 提示客户端作废凭证。

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::{
        middleware::auth::AuthInfoExtractor,
        response::{success_response, ApiResponse},
    },
    app_state::AppState,
    domain::cleanup_guard::OrderFilter,
    error::AppError,
    repository::orders::OrderRow,
    service::order_service,
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OrderFilterRequest {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub status: Option<String>,
}

impl From<OrderFilterRequest> for OrderFilter {
    fn from(r: OrderFilterRequest) -> Self {
        Self {
            date_start: r.date_start,
            date_end: r.date_end,
            status: r.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    /// 导出筛选条件，客户端保存为清理凭证
    pub filter: OrderFilterRequest,
    pub count: usize,
    pub orders: Vec<OrderRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CleanupRequest {
    pub filter: OrderFilterRequest,
    /// 上次导出的筛选条件（清理凭证），未导出则不传
    pub last_exported_filter: Option<OrderFilterRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    pub deleted: u64,
    /// 凭证一次性：清理成功后客户端必须清除
    pub clear_export_token: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/export", post(export_orders))
        .route("/cleanup", post(cleanup_orders))
}

/// POST /api/v1/orders/export
#[utoipa::path(
    post,
    path = "/api/v1/orders/export",
    request_body = OrderFilterRequest,
    responses(
        (status = 200, description = "Exported orders", body = ExportResponse)
    )
)]
pub async fn export_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Json(req): Json<OrderFilterRequest>,
) -> Result<Json<ApiResponse<ExportResponse>>, AppError> {
    auth.0.require_admin()?;
    let filter: OrderFilter = req.clone().into();
    let orders = order_service::export_orders(&state.pool, &filter).await?;
    success_response(ExportResponse {
        filter: req,
        count: orders.len(),
        orders,
    })
}

/// POST /api/v1/orders/cleanup
///
/// 仅当请求条件与上次导出条件完全一致时删除
#[utoipa::path(
    post,
    path = "/api/v1/orders/cleanup",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Cleanup result", body = CleanupResponse),
        (status = 400, description = "Export required or filter mismatch")
    )
)]
pub async fn cleanup_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Json(req): Json<CleanupRequest>,
) -> Result<Json<ApiResponse<CleanupResponse>>, AppError> {
    auth.0.require_admin()?;
    let requested: OrderFilter = req.filter.into();
    let last_exported: Option<OrderFilter> = req.last_exported_filter.map(Into::into);
    let deleted =
        order_service::cleanup_orders(&state.pool, &requested, last_exported.as_ref()).await?;
    success_response(CleanupResponse {
        deleted,
        clear_export_token: true,
    })
}
