//! 提现服务：创建（风控评分 + 自动审批）与操作员状态流转
//!
//! 创建流程整体跑在一个事务里，先对分销商行 FOR UPDATE，
//! 再读当日/当月聚合并插入记录，保证同一分销商的并发请求
//! 不会绕过每日笔数/金额限制。

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::gate;
use crate::domain::risk::{self, DistributorHistory, RiskInput};
use crate::domain::withdrawal::{self, WithdrawalAction, WithdrawalStatus};
use crate::error::AppError;
use crate::infrastructure::db::PgPool;
use crate::repository::{distributors, security_alerts, withdrawals};
use crate::repository::withdrawals::{NewWithdrawal, WithdrawalRecord};
use crate::service::risk_config_service;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWithdrawalInput {
    pub distributor_id: Uuid,
    pub amount: Decimal,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_account_name: String,
}

/// 创建提现申请：校验 → 锁行 → 评分 → 自动审批判定 → 落库
pub async fn create_withdrawal(
    pool: &PgPool,
    input: CreateWithdrawalInput,
) -> Result<WithdrawalRecord, AppError> {
    if input.amount <= Decimal::ZERO {
        return Err(AppError::validation_failed("Amount must be positive"));
    }
    if input.bank_name.trim().is_empty()
        || input.bank_account.trim().is_empty()
        || input.bank_account_name.trim().is_empty()
    {
        return Err(AppError::validation_failed("Bank account info is required"));
    }

    let config = risk_config_service::load_snapshot(pool).await?;
    if input.amount < config.min_withdrawal_amount {
        return Err(AppError::validation_failed(format!(
            "Amount below minimum withdrawal amount {}",
            config.min_withdrawal_amount
        )));
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let distributor = distributors::lock_for_update(&mut *tx, input.distributor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Distributor not found"))?;

    let agg = withdrawals::history_aggregates(&mut *tx, input.distributor_id).await?;
    let history = DistributorHistory {
        account_age_days: distributor.account_age_days(now),
        identity_verified: distributor.identity_verified,
        today_count: agg.today_count,
        today_amount: agg.today_amount,
        month_count: agg.month_count,
        month_amount: agg.month_amount,
        average_amount: agg.average_amount,
        prior_rejected_count: agg.prior_rejected_count,
    };

    let evaluation = risk::evaluate(&RiskInput {
        amount: input.amount,
        requested_at: now,
        history: &history,
        config: &config,
    })?;
    let decision = gate::decide(input.amount, &history, &evaluation, &config);

    let (fee, actual_amount) = withdrawal::split_fee(input.amount, config.fee_rate);

    let auto = decision.is_auto_approved();
    let status = if auto {
        WithdrawalStatus::Processing
    } else {
        WithdrawalStatus::Pending
    };

    if !distributors::reserve_balance(&mut *tx, input.distributor_id, input.amount).await? {
        return Err(AppError::insufficient_balance(format!(
            "Available balance is less than {}",
            input.amount
        )));
    }

    let record = withdrawals::insert(
        &mut *tx,
        &NewWithdrawal {
            id: Uuid::new_v4(),
            distributor_id: input.distributor_id,
            amount: input.amount,
            fee,
            actual_amount,
            status: status.as_str().to_string(),
            bank_name: input.bank_name,
            bank_account: input.bank_account,
            bank_account_name: input.bank_account_name,
            is_auto_approved: auto,
            auto_approved_at: auto.then_some(now),
            risk_score: evaluation.score,
            risk_check_result: serde_json::to_value(&evaluation)?,
            processed_at: auto.then_some(now),
        },
    )
    .await?;

    if decision.flagged {
        security_alerts::insert(
            &mut *tx,
            input.distributor_id,
            Some(record.id),
            "high_risk_withdrawal",
            "high",
            serde_json::json!({
                "score": evaluation.score,
                "risk_level": evaluation.risk_level.as_str(),
                "risks": evaluation.triggered_factors,
                "amount": input.amount,
            }),
        )
        .await?;
        warn!(
            withdrawal_id = %record.id,
            distributor_id = %input.distributor_id,
            score = evaluation.score,
            "High risk withdrawal flagged for review"
        );
    }

    tx.commit().await?;

    info!(
        withdrawal_id = %record.id,
        distributor_id = %input.distributor_id,
        amount = %input.amount,
        status = %record.status,
        auto_approved = auto,
        "Withdrawal request created"
    );
    Ok(record)
}

pub async fn get_withdrawal(pool: &PgPool, id: Uuid) -> Result<WithdrawalRecord, AppError> {
    withdrawals::get_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Withdrawal request not found"))
}

/// 分页参数归一化：page/page_size 都收敛到安全区间，
/// 恶意的超大 page 不会让 OFFSET 溢出
fn page_to_limit_offset(page: i64, page_size: i64) -> (i64, i64) {
    let page = page.clamp(1, 1_000_000);
    let page_size = page_size.clamp(1, 100);
    (page_size, (page - 1) * page_size)
}

pub async fn list_withdrawals(
    pool: &PgPool,
    distributor_id: Option<Uuid>,
    status: Option<String>,
    page: i64,
    page_size: i64,
) -> Result<Vec<WithdrawalRecord>, AppError> {
    let (limit, offset) = page_to_limit_offset(page, page_size);
    if let Some(s) = status.as_deref() {
        WithdrawalStatus::parse(s)
            .map_err(|_| AppError::validation_failed(format!("Unknown status '{}'", s)))?;
    }
    let rows = withdrawals::list(pool, distributor_id, status, limit, offset).await?;
    Ok(rows)
}

/// 操作员审批通过：pending → processing
pub async fn approve_withdrawal(pool: &PgPool, id: Uuid) -> Result<WithdrawalRecord, AppError> {
    transition(pool, id, WithdrawalAction::Approve).await
}

/// 操作员拒绝：pending → rejected，金额退回可用余额
pub async fn reject_withdrawal(
    pool: &PgPool,
    id: Uuid,
    reason: String,
) -> Result<WithdrawalRecord, AppError> {
    transition(pool, id, WithdrawalAction::Reject { reason }).await
}

/// 出款完成：processing → completed，累计已提现金额
pub async fn complete_withdrawal(
    pool: &PgPool,
    id: Uuid,
    transaction_id: String,
) -> Result<WithdrawalRecord, AppError> {
    transition(pool, id, WithdrawalAction::Complete { transaction_id }).await
}

/// 状态流转公共路径：锁单 → 纯函数校验 → 余额副作用 → 落库
async fn transition(
    pool: &PgPool,
    id: Uuid,
    action: WithdrawalAction,
) -> Result<WithdrawalRecord, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let record = withdrawals::get_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Withdrawal request not found"))?;
    let from = WithdrawalStatus::parse(&record.status)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let to = withdrawal::apply(from, &action)?;

    let (processed_at, completed_at, rejected_reason, transaction_id) = match &action {
        WithdrawalAction::Approve => (Some(now), None, None, None),
        WithdrawalAction::Reject { reason } => {
            distributors::release_balance(&mut *tx, record.distributor_id, record.amount).await?;
            // processed_at 专指进入 processing 的时刻，拒绝的单子从未进入
            (None, None, Some(reason.as_str()), None)
        }
        WithdrawalAction::Complete { transaction_id } => {
            distributors::finalize_withdrawal(&mut *tx, record.distributor_id, record.amount)
                .await?;
            (None, Some(now), None, Some(transaction_id.as_str()))
        }
    };

    let updated = withdrawals::apply_transition(
        &mut *tx,
        id,
        to.as_str(),
        processed_at,
        completed_at,
        rejected_reason,
        transaction_id,
    )
    .await?;

    tx.commit().await?;

    info!(
        withdrawal_id = %id,
        from = from.as_str(),
        to = to.as_str(),
        action = action.name(),
        "Withdrawal transition applied"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped_against_overflow() {
        assert_eq!(page_to_limit_offset(1, 20), (20, 0));
        assert_eq!(page_to_limit_offset(3, 50), (50, 100));
        // 非法输入收敛到安全区间
        assert_eq!(page_to_limit_offset(0, 0), (1, 0));
        assert_eq!(page_to_limit_offset(-5, 500), (100, 0));
        // 超大页码不会溢出为负 OFFSET
        let (limit, offset) = page_to_limit_offset(i64::MAX, i64::MAX);
        assert_eq!(limit, 100);
        assert_eq!(offset, (1_000_000 - 1) * 100);
        assert!(offset > 0);
    }
}
