use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::infrastructure::db::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DistributorRow {
    pub id: Uuid,
    pub identity_verified: bool,
    pub available_balance: Decimal,
    pub pending_commission: Decimal,
    pub withdrawn_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl DistributorRow {
    /// 账户年龄（天），提现时刻相对注册时刻
    pub fn account_age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<DistributorRow>, sqlx::Error> {
    sqlx::query_as::<_, DistributorRow>(
        "SELECT id, identity_verified, available_balance, pending_commission, withdrawn_amount, created_at \
         FROM distributors WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// 行锁：同一分销商的创建请求串行化，
/// 每日/每月限额检查与插入之间不会被并发请求插队
pub async fn lock_for_update(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
) -> Result<Option<DistributorRow>, sqlx::Error> {
    sqlx::query_as::<_, DistributorRow>(
        "SELECT id, identity_verified, available_balance, pending_commission, withdrawn_amount, created_at \
         FROM distributors WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// 创建时冻结余额。WHERE 带余额判断，返回 0 行即余额不足
pub async fn reserve_balance(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    amount: Decimal,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE distributors SET available_balance = available_balance - $2 \
         WHERE id = $1 AND available_balance >= $2",
    )
    .bind(id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// 拒绝时解冻：金额退回可用余额
pub async fn release_balance(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    amount: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE distributors SET available_balance = available_balance + $2 WHERE id = $1",
    )
    .bind(id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

/// 完成时结转：创建时已从可用余额扣出，这里只累计已提现
pub async fn finalize_withdrawal(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    amount: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE distributors SET withdrawn_amount = withdrawn_amount + $2 WHERE id = $1",
    )
    .bind(id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

/// 佣金结算：待结算 → 可用
pub async fn settle_commission(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    amount: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE distributors \
         SET pending_commission = pending_commission - $2, \
             available_balance = available_balance + $2 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}

/// 佣金取消（订单退款）：只减待结算
pub async fn cancel_pending_commission(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    amount: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE distributors SET pending_commission = pending_commission - $2 WHERE id = $1",
    )
    .bind(id)
    .bind(amount)
    .execute(conn)
    .await?;
    Ok(())
}
