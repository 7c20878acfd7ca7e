//! 安全告警 API：运营查看待处理的高风险告警

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    api::{
        middleware::auth::AuthInfoExtractor,
        response::{success_response, ApiResponse},
    },
    app_state::AppState,
    error::AppError,
    repository::security_alerts::{self, SecurityAlertRow},
};

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub limit: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_alerts))
}

/// GET /api/v1/security-alerts
#[utoipa::path(
    get,
    path = "/api/v1/security-alerts",
    responses(
        (status = 200, description = "Open security alerts")
    )
)]
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Query(query): Query<AlertQuery>,
) -> Result<Json<ApiResponse<Vec<SecurityAlertRow>>>, AppError> {
    auth.0.require_operator()?;
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let alerts = security_alerts::list_open(&state.pool, limit).await?;
    success_response(alerts)
}
