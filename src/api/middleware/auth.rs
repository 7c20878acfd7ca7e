//! 认证中间件：验证 Bearer Token 并注入认证上下文

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app_state::AppState, error::AppError, infrastructure::jwt};

pub const ROLE_DISTRIBUTOR: &str = "distributor";
pub const ROLE_OPERATOR: &str = "operator";
pub const ROLE_ADMIN: &str = "admin";

/// 认证信息（从 Token 中提取）
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthInfo {
    /// 操作员及以上：审批/拒绝/完成提现、查看配置
    pub fn require_operator(&self) -> Result<(), AppError> {
        if self.role == ROLE_OPERATOR || self.role == ROLE_ADMIN {
            Ok(())
        } else {
            Err(AppError::permission_denied("Operator role required"))
        }
    }

    /// 仅管理员：改配置、导出/清理订单、触发结算
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == ROLE_ADMIN {
            Ok(())
        } else {
            Err(AppError::permission_denied("Admin role required"))
        }
    }
}

/// 认证中间件
/// 1. 提取 Authorization 头，校验 Bearer 格式
/// 2. 验证 JWT 签名与过期时间
/// 3. 解析 user_id / role 注入请求扩展
pub async fn auth_middleware(
    State(_state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS 预检请求直接放行
    if req.method() == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    if !auth_header.starts_with("Bearer ") {
        return Err(AppError::unauthorized("Invalid Authorization header format"));
    }
    let token = auth_header.trim_start_matches("Bearer ").trim();

    let claims = jwt::verify_token(token).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        AppError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| AppError::unauthorized("Invalid user id in token"))?;

    req.extensions_mut().insert(AuthInfo {
        user_id,
        role: claims.role.clone(),
    });
    Ok(next.run(req).await)
}

/// Handler 侧提取器：从请求扩展取出认证上下文
pub struct AuthInfoExtractor(pub AuthInfo);

#[async_trait]
impl<S> FromRequestParts<S> for AuthInfoExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthInfo>()
            .cloned()
            .map(AuthInfoExtractor)
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}
