//! 提现审批状态机
//!
//! 企业级实现：状态转换用闭合枚举 + 穷举匹配，
//! 非法转换在编译期就不可能表达成"忘了检查"的字符串比较。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 提现状态
///
/// ```text
/// Pending -> Processing -> Completed
/// Pending -> Rejected
/// ```
/// Completed / Rejected 为终态，不接受任何后续操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "processing" => Ok(WithdrawalStatus::Processing),
            "completed" => Ok(WithdrawalStatus::Completed),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid withdrawal status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Processing => "processing",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
        }
    }

    /// 判断是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, WithdrawalStatus::Completed | WithdrawalStatus::Rejected)
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作员（或系统自动审批）可执行的动作
#[derive(Debug, Clone)]
pub enum WithdrawalAction {
    /// pending -> processing
    Approve,
    /// pending -> rejected，必须带非空原因
    Reject { reason: String },
    /// processing -> completed，必须带非空交易流水号
    Complete { transaction_id: String },
}

impl WithdrawalAction {
    pub fn name(&self) -> &'static str {
        match self {
            WithdrawalAction::Approve => "approve",
            WithdrawalAction::Reject { .. } => "reject",
            WithdrawalAction::Complete { .. } => "complete",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid state transition: cannot {action} a {from} withdrawal")]
    InvalidState {
        from: WithdrawalStatus,
        action: &'static str,
    },
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

/// 校验并执行一次状态转换
///
/// 先校验状态再校验字段：对 completed 的 reject 报 InvalidState，
/// 而不是先抱怨缺原因。
pub fn apply(
    from: WithdrawalStatus,
    action: &WithdrawalAction,
) -> Result<WithdrawalStatus, TransitionError> {
    use WithdrawalAction as A;
    use WithdrawalStatus as S;

    match (from, action) {
        (S::Pending, A::Approve) => Ok(S::Processing),
        (S::Pending, A::Reject { reason }) => {
            if reason.trim().is_empty() {
                Err(TransitionError::MissingField {
                    field: "rejected_reason",
                })
            } else {
                Ok(S::Rejected)
            }
        }
        (S::Pending, A::Complete { .. }) => Err(TransitionError::InvalidState {
            from,
            action: action.name(),
        }),
        (S::Processing, A::Complete { transaction_id }) => {
            if transaction_id.trim().is_empty() {
                Err(TransitionError::MissingField {
                    field: "transaction_id",
                })
            } else {
                Ok(S::Completed)
            }
        }
        (S::Processing, A::Approve) | (S::Processing, A::Reject { .. }) => {
            Err(TransitionError::InvalidState {
                from,
                action: action.name(),
            })
        }
        // 终态不允许任何转换
        (S::Completed, _) | (S::Rejected, _) => Err(TransitionError::InvalidState {
            from,
            action: action.name(),
        }),
    }
}

/// 按创建时的费率拆分手续费
///
/// actual = amount - fee；fee 固化在记录里，之后改费率不回溯。
pub fn split_fee(amount: Decimal, fee_rate: Decimal) -> (Decimal, Decimal) {
    let fee = (amount * fee_rate).round_dp(2);
    (fee, amount - fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn all_states() -> [WithdrawalStatus; 4] {
        [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Processing,
            WithdrawalStatus::Completed,
            WithdrawalStatus::Rejected,
        ]
    }

    fn all_actions() -> [WithdrawalAction; 3] {
        [
            WithdrawalAction::Approve,
            WithdrawalAction::Reject {
                reason: "duplicate bank account".into(),
            },
            WithdrawalAction::Complete {
                transaction_id: "TXN-001".into(),
            },
        ]
    }

    #[test]
    fn full_transition_grid_has_exactly_three_valid_arrows() {
        let mut ok_pairs = Vec::new();
        for state in all_states() {
            for action in all_actions() {
                if let Ok(next) = apply(state, &action) {
                    ok_pairs.push((state, action.name(), next));
                }
            }
        }
        assert_eq!(
            ok_pairs,
            vec![
                (
                    WithdrawalStatus::Pending,
                    "approve",
                    WithdrawalStatus::Processing
                ),
                (
                    WithdrawalStatus::Pending,
                    "reject",
                    WithdrawalStatus::Rejected
                ),
                (
                    WithdrawalStatus::Processing,
                    "complete",
                    WithdrawalStatus::Completed
                ),
            ]
        );
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for state in [WithdrawalStatus::Completed, WithdrawalStatus::Rejected] {
            assert!(state.is_terminal());
            for action in all_actions() {
                assert_eq!(
                    apply(state, &action),
                    Err(TransitionError::InvalidState {
                        from: state,
                        action: action.name()
                    })
                );
            }
        }
    }

    #[test]
    fn reject_requires_reason() {
        let err = apply(
            WithdrawalStatus::Pending,
            &WithdrawalAction::Reject { reason: "  ".into() },
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::MissingField {
                field: "rejected_reason"
            }
        );
    }

    #[test]
    fn complete_requires_transaction_id() {
        let err = apply(
            WithdrawalStatus::Processing,
            &WithdrawalAction::Complete {
                transaction_id: "".into(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            TransitionError::MissingField {
                field: "transaction_id"
            }
        );
    }

    #[test]
    fn state_precedes_field_validation() {
        // 对 completed 的无原因 reject，报 InvalidState 而非 MissingField
        let err = apply(
            WithdrawalStatus::Completed,
            &WithdrawalAction::Reject { reason: "".into() },
        )
        .unwrap_err();
        assert!(matches!(err, TransitionError::InvalidState { .. }));
    }

    #[test]
    fn fee_split_is_exact() {
        let (fee, actual) = split_fee(dec("100"), dec("0.01"));
        assert_eq!(fee, dec("1.00"));
        assert_eq!(actual, dec("99.00"));
        assert_eq!(actual + fee, dec("100"));
    }

    #[test]
    fn status_round_trips_through_text() {
        for s in all_states() {
            assert_eq!(WithdrawalStatus::parse(s.as_str()).unwrap(), s);
        }
        assert!(WithdrawalStatus::parse("approved").is_err());
    }
}
