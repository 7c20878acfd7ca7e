//! 佣金结算服务：冷却期满的待结算佣金转入可用余额
//!
//! 由外部定时任务（cron）调结算接口触发，单次批量处理。
//! 订单已退款的佣金直接取消，不入账。

use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::infrastructure::db::PgPool;
use crate::repository::{commissions, distributors};
use crate::service::risk_config_service;

const SETTLE_BATCH_SIZE: i64 = 500;

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct SettlementReport {
    pub settled_count: u64,
    pub cancelled_count: u64,
}

/// 结算一批到期佣金。整批一个事务，佣金行 FOR UPDATE
/// 防止并发触发时重复入账
pub async fn settle_due_commissions(pool: &PgPool) -> Result<SettlementReport, AppError> {
    let config = risk_config_service::load_snapshot(pool).await?;

    let mut tx = pool.begin().await?;
    let due =
        commissions::lock_due_pending(&mut *tx, config.settlement_cooldown_days, SETTLE_BATCH_SIZE)
            .await?;

    let mut report = SettlementReport::default();
    for c in &due {
        if c.order_status == "refunded" {
            commissions::mark_cancelled(&mut *tx, c.id).await?;
            distributors::cancel_pending_commission(&mut *tx, c.distributor_id, c.amount).await?;
            report.cancelled_count += 1;
        } else {
            commissions::mark_settled(&mut *tx, c.id).await?;
            distributors::settle_commission(&mut *tx, c.distributor_id, c.amount).await?;
            report.settled_count += 1;
        }
    }
    tx.commit().await?;

    info!(
        settled = report.settled_count,
        cancelled = report.cancelled_count,
        cooldown_days = config.settlement_cooldown_days,
        "Commission settlement batch finished"
    );
    Ok(report)
}
