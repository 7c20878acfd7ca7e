//! 提现风险评分
//!
//! 数据驱动的风险因子注册表：每个因子是「命名谓词 + 配置权重」，
//! 新增/下线因子是一次配置变更，不改代码。评分器本身是纯函数，
//! 配置快照由调用方显式传入，核心逻辑里没有任何全局状态。

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 风险等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// 低风险：可进入自动审批
    Low,
    /// 中风险：人工审核
    Medium,
    /// 高风险：人工审核 + 安全告警
    High,
}

impl RiskLevel {
    /// 分数 -> 等级，阈值为含下界语义：
    /// score == medium_threshold 判 Medium，score == high_threshold 判 High。
    pub fn from_score(score: i64, medium_threshold: i64, high_threshold: i64) -> Self {
        if score >= high_threshold {
            RiskLevel::High
        } else if score >= medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// 风控配置快照
///
/// 每次请求由调用方从配置仓库加载一次，整个评估过程只读这一份，
/// 管理端改配置对下一次评估立即生效。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfigSnapshot {
    // withdrawal 类目
    pub fee_rate: Decimal,
    pub min_withdrawal_amount: Decimal,
    pub auto_approve_enabled: bool,
    pub auto_approve_max_amount: Decimal,
    pub min_account_age_days: i64,
    pub require_identity_verification: bool,
    pub max_requests_per_day: i64,
    pub max_amount_per_day: Decimal,
    pub max_amount_per_month: Decimal,
    pub settlement_cooldown_days: i64,
    // risk_weight 类目：因子名 -> 权重（非负）
    pub weights: BTreeMap<String, i64>,
    // risk_threshold 类目
    pub medium_threshold: i64,
    pub high_threshold: i64,
}

/// 分销商提现历史画像（由仓储层聚合而来）
#[derive(Debug, Clone, Default)]
pub struct DistributorHistory {
    pub account_age_days: i64,
    pub identity_verified: bool,
    /// 今日已受理笔数 / 金额（不含本笔）
    pub today_count: i64,
    pub today_amount: Decimal,
    /// 本月已受理笔数 / 金额（不含本笔）
    pub month_count: i64,
    pub month_amount: Decimal,
    /// 历史平均单笔金额（无历史则为 None）
    pub average_amount: Option<Decimal>,
    /// 历史被拒/被标记笔数
    pub prior_rejected_count: i64,
}

/// 一次评估的输入
#[derive(Debug, Clone)]
pub struct RiskInput<'a> {
    pub amount: Decimal,
    pub requested_at: DateTime<Utc>,
    pub history: &'a DistributorHistory,
    pub config: &'a RiskConfigSnapshot,
}

/// 评估结果，序列化后即提现记录上的 risk_check_result
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RiskEvaluation {
    pub score: i64,
    pub risk_level: RiskLevel,
    #[serde(rename = "risks")]
    pub triggered_factors: Vec<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RiskError {
    #[error("risk config not initialized: missing {key}")]
    ConfigNotInitialized { key: &'static str },
}

/// 命名谓词 + 权重键。权重在配置里，谓词在代码里。
pub struct RiskFactor {
    pub name: &'static str,
    triggered: fn(&RiskInput) -> bool,
}

/// 注册表。顺序即 triggered_factors 的输出顺序。
pub const RISK_FACTORS: &[RiskFactor] = &[
    RiskFactor {
        name: "new_account",
        triggered: |i| i.history.account_age_days < i.config.min_account_age_days,
    },
    RiskFactor {
        name: "unverified_identity",
        triggered: |i| !i.history.identity_verified,
    },
    RiskFactor {
        name: "large_amount",
        triggered: |i| i.amount > i.config.auto_approve_max_amount,
    },
    RiskFactor {
        name: "high_frequency",
        triggered: |i| i.history.today_count + 1 > i.config.max_requests_per_day,
    },
    RiskFactor {
        name: "daily_amount",
        triggered: |i| i.history.today_amount + i.amount > i.config.max_amount_per_day,
    },
    RiskFactor {
        name: "monthly_amount",
        triggered: |i| i.history.month_amount + i.amount > i.config.max_amount_per_month,
    },
    RiskFactor {
        name: "amount_spike",
        // 单笔金额超过历史平均 3 倍视为异常放大
        triggered: |i| match i.history.average_amount {
            Some(avg) if avg > Decimal::ZERO => i.amount > avg * Decimal::from(3),
            _ => false,
        },
    },
    RiskFactor {
        name: "prior_rejection",
        triggered: |i| i.history.prior_rejected_count > 0,
    },
    RiskFactor {
        name: "night_hours",
        // 凌晨 2-6 点（UTC）发起
        triggered: |i| (2..6).contains(&i.requested_at.hour()),
    },
];

/// 评估一笔提现请求
///
/// score = 触发因子权重之和；权重或阈值缺失直接报错，
/// 绝不静默取默认值——宁可创建失败也不错判。
pub fn evaluate(input: &RiskInput) -> Result<RiskEvaluation, RiskError> {
    // 先整体校验权重齐全，未触发的因子缺权重同样拒绝评分
    for factor in RISK_FACTORS {
        if !input.config.weights.contains_key(factor.name) {
            return Err(RiskError::ConfigNotInitialized { key: factor.name });
        }
    }

    let mut score: i64 = 0;
    let mut triggered = Vec::new();
    for factor in RISK_FACTORS {
        if (factor.triggered)(input) {
            score += input.config.weights[factor.name];
            triggered.push(factor.name.to_string());
        }
    }

    let risk_level = RiskLevel::from_score(
        score,
        input.config.medium_threshold,
        input.config.high_threshold,
    );

    Ok(RiskEvaluation {
        score,
        risk_level,
        triggered_factors: triggered,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// 参考系统的默认配置，测试用
    pub fn snapshot() -> RiskConfigSnapshot {
        let weights = [
            ("new_account", 10),
            ("unverified_identity", 8),
            ("large_amount", 10),
            ("high_frequency", 8),
            ("daily_amount", 6),
            ("monthly_amount", 6),
            ("amount_spike", 8),
            ("prior_rejection", 12),
            ("night_hours", 4),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        RiskConfigSnapshot {
            fee_rate: dec("0.01"),
            min_withdrawal_amount: dec("10"),
            auto_approve_enabled: true,
            auto_approve_max_amount: dec("5000"),
            min_account_age_days: 30,
            require_identity_verification: true,
            max_requests_per_day: 3,
            max_amount_per_day: dec("10000"),
            max_amount_per_month: dec("50000"),
            settlement_cooldown_days: 15,
            weights,
            medium_threshold: 10,
            high_threshold: 30,
        }
    }

    /// 一个各项都"干净"的历史画像：老账号、已实名、当天首笔
    pub fn clean_history() -> DistributorHistory {
        DistributorHistory {
            account_age_days: 200,
            identity_verified: true,
            today_count: 0,
            today_amount: Decimal::ZERO,
            month_count: 0,
            month_amount: Decimal::ZERO,
            average_amount: None,
            prior_rejected_count: 0,
        }
    }

    /// 中午 12 点（UTC），避开 night_hours 因子
    pub fn daytime() -> DateTime<Utc> {
        "2026-08-10T12:00:00Z".parse().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::{test_support::*, *};

    #[test]
    fn clean_request_scores_zero() {
        let config = snapshot();
        let history = clean_history();
        let eval = evaluate(&RiskInput {
            amount: dec("80"),
            requested_at: daytime(),
            history: &history,
            config: &config,
        })
        .unwrap();
        assert_eq!(eval.score, 0);
        assert_eq!(eval.risk_level, RiskLevel::Low);
        assert!(eval.triggered_factors.is_empty());
    }

    #[test]
    fn score_is_sum_of_triggered_weights() {
        let config = snapshot();
        let mut history = clean_history();
        history.account_age_days = 5; // new_account: 10
        history.identity_verified = false; // unverified_identity: 8
        let eval = evaluate(&RiskInput {
            amount: dec("80"),
            requested_at: daytime(),
            history: &history,
            config: &config,
        })
        .unwrap();
        assert_eq!(eval.score, 18);
        assert_eq!(
            eval.triggered_factors,
            vec!["new_account".to_string(), "unverified_identity".to_string()]
        );
        assert_eq!(eval.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn thresholds_are_inclusive_lower_bound() {
        assert_eq!(RiskLevel::from_score(9, 10, 30), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(10, 10, 30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(29, 10, 30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(30, 10, 30), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100, 10, 30), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0, 10, 30), RiskLevel::Low);
    }

    #[test]
    fn missing_weight_is_a_hard_error() {
        let mut config = snapshot();
        config.weights.remove("night_hours");
        let history = clean_history();
        let err = evaluate(&RiskInput {
            amount: dec("80"),
            requested_at: daytime(),
            history: &history,
            config: &config,
        })
        .unwrap_err();
        assert_eq!(err, RiskError::ConfigNotInitialized { key: "night_hours" });
    }

    #[test]
    fn amount_spike_needs_positive_average() {
        let config = snapshot();
        let mut history = clean_history();
        history.average_amount = Some(dec("100"));
        let eval = evaluate(&RiskInput {
            amount: dec("301"),
            requested_at: daytime(),
            history: &history,
            config: &config,
        })
        .unwrap();
        assert!(eval
            .triggered_factors
            .contains(&"amount_spike".to_string()));

        // 平均值为 None 时不触发
        history.average_amount = None;
        let eval = evaluate(&RiskInput {
            amount: dec("301"),
            requested_at: daytime(),
            history: &history,
            config: &config,
        })
        .unwrap();
        assert!(!eval
            .triggered_factors
            .contains(&"amount_spike".to_string()));
    }

    #[test]
    fn night_window_is_two_to_six_utc() {
        let config = snapshot();
        let history = clean_history();
        let at_3am: DateTime<Utc> = "2026-08-10T03:30:00Z".parse().unwrap();
        let eval = evaluate(&RiskInput {
            amount: dec("80"),
            requested_at: at_3am,
            history: &history,
            config: &config,
        })
        .unwrap();
        assert_eq!(eval.triggered_factors, vec!["night_hours".to_string()]);
        assert_eq!(eval.score, 4);
    }
}
