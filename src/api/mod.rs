//! HTTP 路由装配：公开路由（健康检查、文档）+ 认证路由（业务 API）

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{app_state::AppState, error::AppError};

pub mod commission_api;
pub mod middleware;
pub mod order_admin_api;
pub mod response;
pub mod risk_config_api;
pub mod security_alert_api;
pub mod withdrawal_api;

#[derive(OpenApi)]
#[openapi(
    paths(
        withdrawal_api::create_withdrawal,
        withdrawal_api::list_withdrawals,
        withdrawal_api::get_withdrawal,
        withdrawal_api::approve_withdrawal,
        withdrawal_api::reject_withdrawal,
        withdrawal_api::complete_withdrawal,
        risk_config_api::list_config,
        risk_config_api::update_config,
        risk_config_api::initialize_config,
        commission_api::settle_commissions,
        security_alert_api::list_alerts,
        order_admin_api::export_orders,
        order_admin_api::cleanup_orders,
    ),
    components(schemas(
        withdrawal_api::CreateWithdrawalRequest,
        withdrawal_api::RejectRequest,
        withdrawal_api::CompleteRequest,
        withdrawal_api::WithdrawalResponse,
        risk_config_api::UpdateConfigRequest,
        risk_config_api::ConfigEntry,
        order_admin_api::OrderFilterRequest,
        order_admin_api::ExportResponse,
        order_admin_api::CleanupRequest,
        order_admin_api::CleanupResponse,
        crate::service::commission_service::SettlementReport,
    )),
    info(
        title = "mallcore API",
        description = "分销提现风控与审批服务"
    )
)]
pub struct ApiDoc;

pub fn routes(state: Arc<AppState>) -> Router {
    // 公开路由（不需要认证）
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .merge(utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state.clone());

    // 业务路由（Bearer Token 认证）
    let protected_routes = Router::new()
        .nest("/api/v1/withdrawals", withdrawal_api::routes())
        .nest("/api/v1/risk-config", risk_config_api::routes())
        .nest("/api/v1/commissions", commission_api::routes())
        .nest("/api/v1/orders", order_admin_api::routes())
        .nest("/api/v1/security-alerts", security_alert_api::routes())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ))
        .with_state(state.clone());

    public_routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /health - 连数据库的深度健康检查
async fn health(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    crate::infrastructure::db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok", "database": "ok" })))
}

/// GET /healthz - 存活探针，不碰数据库
async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
