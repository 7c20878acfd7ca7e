//! mallcore - 分销提现风控与审批服务
//!
//! 核心链路：提现申请 → 风控评分 → 自动审批判定 → 操作员流转，
//! 辅以佣金结算冷却与订单导出清理。规则判定全部是纯函数，
//! 配置快照由调用方显式传入。

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod repository;
pub mod service;

pub use app_state::AppState;
pub use error::{AppError, AppErrorCode};
