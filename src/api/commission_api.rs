//! 佣金结算 API：外部定时任务触发的批量结算入口

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use crate::{
    api::{
        middleware::auth::AuthInfoExtractor,
        response::{success_response, ApiResponse},
    },
    app_state::AppState,
    error::AppError,
    service::commission_service::{self, SettlementReport},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/settle", post(settle_commissions))
}

/// POST /api/v1/commissions/settle
///
/// 结算一批冷却期满的待结算佣金
#[utoipa::path(
    post,
    path = "/api/v1/commissions/settle",
    responses(
        (status = 200, description = "Settlement report", body = SettlementReport)
    )
)]
pub async fn settle_commissions(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
) -> Result<Json<ApiResponse<SettlementReport>>, AppError> {
    auth.0.require_admin()?;
    let report = commission_service::settle_due_commissions(&state.pool).await?;
    success_response(report)
}
