use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::{risk::RiskError, withdrawal::TransitionError};

#[derive(Debug, Clone)]
pub enum AppErrorCode {
    // HTTP 基础错误码
    BadRequest,
    Unauthorized,
    NotFound,
    Internal,

    // 业务错误码
    ConfigNotInitialized,
    InvalidStateTransition,
    ValidationFailed,
    PermissionDenied,
    InsufficientBalance,
    DatabaseError,
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub code: AppErrorCode,
    pub message: String,
    pub status: StatusCode,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code_str = match self.code {
            AppErrorCode::BadRequest => "bad_request",
            AppErrorCode::Unauthorized => "unauthorized",
            AppErrorCode::NotFound => "not_found",
            AppErrorCode::Internal => "internal",

            AppErrorCode::ConfigNotInitialized => "config_not_initialized",
            AppErrorCode::InvalidStateTransition => "invalid_state_transition",
            AppErrorCode::ValidationFailed => "validation_failed",
            AppErrorCode::PermissionDenied => "permission_denied",
            AppErrorCode::InsufficientBalance => "insufficient_balance",
            AppErrorCode::DatabaseError => "database_error",
        };
        let body = ErrorBody {
            code: code_str,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::BadRequest,
            message: msg.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::Unauthorized,
            message: msg.into(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::NotFound,
            message: msg.into(),
            status: StatusCode::NOT_FOUND,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::Internal,
            message: msg.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // 业务错误辅助函数

    /// 风控权重/阈值尚未初始化：该笔创建直接失败，绝不默认放行
    pub fn config_not_initialized(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::ConfigNotInitialized,
            message: msg.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::InvalidStateTransition,
            message: msg.into(),
            status: StatusCode::CONFLICT,
        }
    }

    pub fn validation_failed(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::ValidationFailed,
            message: msg.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::PermissionDenied,
            message: msg.into(),
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn insufficient_balance(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::InsufficientBalance,
            message: msg.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn database_error(msg: impl Into<String>) -> Self {
        Self {
            code: AppErrorCode::DatabaseError,
            message: msg.into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// 状态机违规 -> 结构化响应，在 handler 边界恢复，不吞错
impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidState { .. } => Self::invalid_state_transition(err.to_string()),
            TransitionError::MissingField { .. } => Self::validation_failed(err.to_string()),
        }
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        Self::config_not_initialized(err.to_string())
    }
}

// 从 SQLx 错误转换
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),
            sqlx::Error::Database(ref db_err) => {
                if let Some(code) = db_err.code() {
                    if code == "23505" {
                        // PostgreSQL unique_violation
                        return Self::bad_request("Resource already exists");
                    }
                    if code == "23503" {
                        // PostgreSQL foreign_key_violation
                        return Self::bad_request("Foreign key constraint violation");
                    }
                }
                Self::database_error(format!("Database error: {}", db_err))
            }
            _ => Self::database_error(format!("Database operation failed: {}", err)),
        }
    }
}

// 从 UUID 错误转换
impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        Self::bad_request(format!("Invalid UUID: {}", err))
    }
}

// 从 serde_json 错误转换
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(format!("JSON serialization error: {}", err))
    }
}

// 从 anyhow 错误转换
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::withdrawal::WithdrawalStatus;

    #[test]
    fn transition_errors_map_to_distinct_codes() {
        let invalid: AppError = TransitionError::InvalidState {
            from: WithdrawalStatus::Completed,
            action: "reject",
        }
        .into();
        assert!(matches!(invalid.code, AppErrorCode::InvalidStateTransition));
        assert_eq!(invalid.status, StatusCode::CONFLICT);

        let missing: AppError = TransitionError::MissingField {
            field: "rejected_reason",
        }
        .into();
        assert!(matches!(missing.code, AppErrorCode::ValidationFailed));
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    }
}
