//! 自动审批闸门
//!
//! 纯决策函数：五项硬条件 + 风险等级全部通过才允许自动放行，
//! 任何一项不满足都转人工审核。不做任何副作用，
//! 转状态和发安全告警由调用方执行。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::risk::{DistributorHistory, RiskConfigSnapshot, RiskEvaluation, RiskLevel};

/// 闸门结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    AutoApprove,
    ManualReview,
}

/// 决策结果
///
/// flagged 仅在高风险时为 true，调用方据此落安全告警；
/// 仅因额度/条件不满足转人工的低中风险请求不标记。
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    pub flagged: bool,
    /// 未通过的条件名，给运营看的审核提示
    pub failed_conditions: Vec<&'static str>,
}

impl GateDecision {
    pub fn is_auto_approved(&self) -> bool {
        self.outcome == GateOutcome::AutoApprove
    }
}

/// 自动审批决策
pub fn decide(
    amount: Decimal,
    history: &DistributorHistory,
    evaluation: &RiskEvaluation,
    config: &RiskConfigSnapshot,
) -> GateDecision {
    let mut failed = Vec::new();

    if !config.auto_approve_enabled {
        failed.push("auto_approve_disabled");
    }
    if amount > config.auto_approve_max_amount {
        failed.push("amount_above_auto_approve_max");
    }
    if history.account_age_days < config.min_account_age_days {
        failed.push("account_age_below_minimum");
    }
    if config.require_identity_verification && !history.identity_verified {
        failed.push("identity_unverified");
    }
    // 当日/当月限额：计入本笔后不得超限
    if history.today_count + 1 > config.max_requests_per_day {
        failed.push("daily_count_limit");
    }
    if history.today_amount + amount > config.max_amount_per_day {
        failed.push("daily_amount_limit");
    }
    if history.month_amount + amount > config.max_amount_per_month {
        failed.push("monthly_amount_limit");
    }
    if evaluation.risk_level != RiskLevel::Low {
        failed.push("risk_level_not_low");
    }

    let outcome = if failed.is_empty() {
        GateOutcome::AutoApprove
    } else {
        GateOutcome::ManualReview
    };

    GateDecision {
        outcome,
        flagged: evaluation.risk_level == RiskLevel::High,
        failed_conditions: failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::test_support::{clean_history, dec, snapshot};

    fn low_risk_eval() -> RiskEvaluation {
        RiskEvaluation {
            score: 0,
            risk_level: RiskLevel::Low,
            triggered_factors: vec![],
        }
    }

    #[test]
    fn all_conditions_pass_means_auto_approve() {
        let decision = decide(dec("80"), &clean_history(), &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::AutoApprove);
        assert!(!decision.flagged);
        assert!(decision.failed_conditions.is_empty());
    }

    // 以下逐项破坏一个条件，其余保持通过——每一项都必须独立地
    // 把结论拉回人工审核。

    #[test]
    fn amount_above_max_forces_manual_review() {
        let decision = decide(dec("6000"), &clean_history(), &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert!(!decision.flagged); // 低风险分数，仅条件不满足，不标记
        assert_eq!(
            decision.failed_conditions,
            vec!["amount_above_auto_approve_max"]
        );
    }

    #[test]
    fn young_account_forces_manual_review() {
        let mut history = clean_history();
        history.account_age_days = 10;
        let decision = decide(dec("80"), &history, &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert_eq!(decision.failed_conditions, vec!["account_age_below_minimum"]);
    }

    #[test]
    fn unverified_identity_forces_manual_review() {
        let mut history = clean_history();
        history.identity_verified = false;
        let decision = decide(dec("80"), &history, &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert_eq!(decision.failed_conditions, vec!["identity_unverified"]);
    }

    #[test]
    fn identity_check_respects_config_switch() {
        let mut config = snapshot();
        config.require_identity_verification = false;
        let mut history = clean_history();
        history.identity_verified = false;
        let decision = decide(dec("80"), &history, &low_risk_eval(), &config);
        assert_eq!(decision.outcome, GateOutcome::AutoApprove);
    }

    #[test]
    fn daily_count_limit_forces_manual_review() {
        let mut history = clean_history();
        history.today_count = 3; // max_requests_per_day = 3，本笔为第 4 笔
        let decision = decide(dec("80"), &history, &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert_eq!(decision.failed_conditions, vec!["daily_count_limit"]);
    }

    #[test]
    fn daily_amount_limit_counts_current_request() {
        let mut history = clean_history();
        history.today_amount = dec("9950");
        let decision = decide(dec("100"), &history, &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert_eq!(decision.failed_conditions, vec!["daily_amount_limit"]);
    }

    #[test]
    fn monthly_amount_limit_forces_manual_review() {
        let mut history = clean_history();
        history.month_amount = dec("49990");
        let decision = decide(dec("100"), &history, &low_risk_eval(), &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert_eq!(decision.failed_conditions, vec!["monthly_amount_limit"]);
    }

    #[test]
    fn non_low_risk_forces_manual_review() {
        let evaluation = RiskEvaluation {
            score: 12,
            risk_level: RiskLevel::Medium,
            triggered_factors: vec!["new_account".into()],
        };
        let decision = decide(dec("80"), &clean_history(), &evaluation, &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert!(!decision.flagged);
    }

    #[test]
    fn high_risk_is_flagged_for_security_alert() {
        let evaluation = RiskEvaluation {
            score: 35,
            risk_level: RiskLevel::High,
            triggered_factors: vec!["prior_rejection".into(), "large_amount".into()],
        };
        let decision = decide(dec("80"), &clean_history(), &evaluation, &snapshot());
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert!(decision.flagged);
    }

    #[test]
    fn disabled_switch_blocks_auto_approval() {
        let mut config = snapshot();
        config.auto_approve_enabled = false;
        let decision = decide(dec("80"), &clean_history(), &low_risk_eval(), &config);
        assert_eq!(decision.outcome, GateOutcome::ManualReview);
        assert!(!decision.flagged);
    }
}
