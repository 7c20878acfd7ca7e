//! 提现 API：创建申请、查询、操作员审批流转

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    api::{
        middleware::auth::{AuthInfoExtractor, ROLE_DISTRIBUTOR},
        response::{success_response, ApiResponse},
    },
    app_state::AppState,
    error::AppError,
    repository::withdrawals::WithdrawalRecord,
    service::withdrawal_service::{self, CreateWithdrawalInput},
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 请求/响应模型
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWithdrawalRequest {
    /// 提现金额
    pub amount: Decimal,
    /// 收款银行
    pub bank_name: String,
    /// 收款账号
    pub bank_account: String,
    /// 收款户名
    pub bank_account_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub distributor_id: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// 拒绝原因，必填
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRequest {
    /// 银行出款流水号，必填
    pub transaction_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WithdrawalResponse {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub amount: Decimal,
    pub fee: Decimal,
    pub actual_amount: Decimal,
    pub status: String,
    pub is_auto_approved: bool,
    pub risk_score: Option<i64>,
    pub risk_check_result: Option<serde_json::Value>,
    pub rejected_reason: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<WithdrawalRecord> for WithdrawalResponse {
    fn from(r: WithdrawalRecord) -> Self {
        Self {
            id: r.id,
            distributor_id: r.distributor_id,
            amount: r.amount,
            fee: r.fee,
            actual_amount: r.actual_amount,
            status: r.status,
            is_auto_approved: r.is_auto_approved,
            risk_score: r.risk_score,
            risk_check_result: r.risk_check_result,
            rejected_reason: r.rejected_reason,
            transaction_id: r.transaction_id,
            created_at: r.created_at,
            processed_at: r.processed_at,
            completed_at: r.completed_at,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Routes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_withdrawal).get(list_withdrawals))
        .route("/:id", get(get_withdrawal))
        .route("/:id/approve", post(approve_withdrawal))
        .route("/:id/reject", post(reject_withdrawal))
        .route("/:id/complete", post(complete_withdrawal))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Handlers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /api/v1/withdrawals
///
/// 分销商发起提现申请，入口即跑风控评分与自动审批判定
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals",
    request_body = CreateWithdrawalRequest,
    responses(
        (status = 200, description = "Withdrawal created", body = WithdrawalResponse)
    )
)]
pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Json(req): Json<CreateWithdrawalRequest>,
) -> Result<Json<ApiResponse<WithdrawalResponse>>, AppError> {
    let record = withdrawal_service::create_withdrawal(
        &state.pool,
        CreateWithdrawalInput {
            distributor_id: auth.0.user_id,
            amount: req.amount,
            bank_name: req.bank_name,
            bank_account: req.bank_account,
            bank_account_name: req.bank_account_name,
        },
    )
    .await?;
    success_response(record.into())
}

/// GET /api/v1/withdrawals
///
/// 分销商只能看自己的记录，操作员可按分销商/状态筛选
#[utoipa::path(
    get,
    path = "/api/v1/withdrawals",
    responses(
        (status = 200, description = "Withdrawal list")
    )
)]
pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<WithdrawalResponse>>>, AppError> {
    let distributor_id = if auth.0.role == ROLE_DISTRIBUTOR {
        Some(auth.0.user_id)
    } else {
        query.distributor_id
    };
    let rows = withdrawal_service::list_withdrawals(
        &state.pool,
        distributor_id,
        query.status,
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(20),
    )
    .await?;
    success_response(rows.into_iter().map(Into::into).collect())
}

/// GET /api/v1/withdrawals/:id
#[utoipa::path(
    get,
    path = "/api/v1/withdrawals/{id}",
    responses(
        (status = 200, description = "Withdrawal detail", body = WithdrawalResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_withdrawal(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithdrawalResponse>>, AppError> {
    let record = withdrawal_service::get_withdrawal(&state.pool, id).await?;
    if auth.0.role == ROLE_DISTRIBUTOR && record.distributor_id != auth.0.user_id {
        return Err(AppError::not_found("Withdrawal request not found"));
    }
    success_response(record.into())
}

/// POST /api/v1/withdrawals/:id/approve
///
/// 操作员审批通过：pending → processing
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/approve",
    responses(
        (status = 200, description = "Approved", body = WithdrawalResponse),
        (status = 409, description = "Invalid state transition")
    )
)]
pub async fn approve_withdrawal(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithdrawalResponse>>, AppError> {
    auth.0.require_operator()?;
    let record = withdrawal_service::approve_withdrawal(&state.pool, id).await?;
    success_response(record.into())
}

/// POST /api/v1/withdrawals/:id/reject
///
/// 操作员拒绝：pending → rejected，余额解冻
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/reject",
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Rejected", body = WithdrawalResponse),
        (status = 409, description = "Invalid state transition")
    )
)]
pub async fn reject_withdrawal(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<ApiResponse<WithdrawalResponse>>, AppError> {
    auth.0.require_operator()?;
    let record = withdrawal_service::reject_withdrawal(&state.pool, id, req.reason).await?;
    success_response(record.into())
}

/// POST /api/v1/withdrawals/:id/complete
///
/// 出款完成：processing → completed
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals/{id}/complete",
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Completed", body = WithdrawalResponse),
        (status = 409, description = "Invalid state transition")
    )
)]
pub async fn complete_withdrawal(
    State(state): State<Arc<AppState>>,
    auth: AuthInfoExtractor,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<ApiResponse<WithdrawalResponse>>, AppError> {
    auth.0.require_operator()?;
    let record =
        withdrawal_service::complete_withdrawal(&state.pool, id, req.transaction_id).await?;
    success_response(record.into())
}
