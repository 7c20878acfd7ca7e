//! 风控配置 API：查看、更新、播种默认值

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    api::{
        middleware::auth::AuthInfoExtractor,
        response::{success_response, ApiResponse},
    },
    app_state::AppState,
    error::AppError,
    repository::risk_config::RiskConfigRow,
    service::risk_config_service,
};

#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    /// withdrawal / risk_weight / risk_threshold
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateConfigRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub category: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl From<RiskConfigRow> for ConfigEntry {
    fn from(r: RiskConfigRow) -> Self {
        Self {
            key: r.key,
            value: r.value,
            value_type: r.value_type,
            category: r.category,
            description: r.description,
            updated_at: r.updated_at,
        }
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_config).put(update_config))
        .route("/initialize", post(initialize_config))
}

/// GET /api/v1/risk-config
#[utoipa::path(
    get,
    path = "/api/v1/risk-config",
    responses(
        (status = 200, description = "Config entries")
    )
)]
pub async fn list_config(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<ApiResponse<Vec<ConfigEntry>>>, AppError> {
    auth.0.require_operator()?;
    let rows = risk_config_service::list_config(&state.pool, query.category.as_deref()).await?;
    success_response(rows.into_iter().map(Into::into).collect())
}

/// PUT /api/v1/risk-config
///
/// 管理员更新单个配置项，按 value_type 校验
#[utoipa::path(
    put,
    path = "/api/v1/risk-config",
    request_body = UpdateConfigRequest,
    responses(
        (status = 200, description = "Updated entry", body = ConfigEntry),
        (status = 404, description = "Unknown key")
    )
)]
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Json(req): Json<UpdateConfigRequest>,
) -> Result<Json<ApiResponse<ConfigEntry>>, AppError> {
    auth.0.require_admin()?;
    let row = risk_config_service::update_config(&state.pool, &req.key, &req.value).await?;
    success_response(row.into())
}

/// POST /api/v1/risk-config/initialize
///
/// 幂等播种默认配置，返回新插入条数
#[utoipa::path(
    post,
    path = "/api/v1/risk-config/initialize",
    responses(
        (status = 200, description = "Seeded count")
    )
)]
pub async fn initialize_config(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
) -> Result<Json<ApiResponse<usize>>, AppError> {
    auth.0.require_admin()?;
    let inserted = risk_config_service::initialize_defaults(&state.pool).await?;
    success_response(inserted)
}
