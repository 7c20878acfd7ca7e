//! Domain 模块
//!
//! 风控核心的领域层：评分器、闸门、状态机、清理守卫全部是纯函数，
//! 配置快照与历史画像由服务层显式传入，单测不需要任何外部依赖。

pub mod cleanup_guard;
pub mod gate;
pub mod risk;
pub mod withdrawal;

// Re-exports
// 重新导出常用类型
pub use cleanup_guard::{can_cleanup, CleanupVerdict, OrderFilter};
pub use gate::{decide, GateDecision, GateOutcome};
pub use risk::{
    evaluate, DistributorHistory, RiskConfigSnapshot, RiskError, RiskEvaluation, RiskInput,
    RiskLevel,
};
pub use withdrawal::{apply, split_fee, TransitionError, WithdrawalAction, WithdrawalStatus};
