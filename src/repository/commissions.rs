use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DueCommission {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub order_status: String,
    pub created_at: DateTime<Utc>,
}

/// 到期待结算佣金：pending 且创建时间早于冷却期，
/// 带出订单状态用于判断退款取消。锁行防止并发结算重复入账
pub async fn lock_due_pending(
    conn: &mut sqlx::PgConnection,
    cooldown_days: i64,
    limit: i64,
) -> Result<Vec<DueCommission>, sqlx::Error> {
    sqlx::query_as::<_, DueCommission>(
        r#"
        SELECT c.id, c.distributor_id, c.order_id, c.amount,
               o.status AS order_status, c.created_at
        FROM commissions c
        JOIN orders o ON o.id = c.order_id
        WHERE c.status = 'pending'
          AND c.created_at < NOW() - ($1 * INTERVAL '1 day')
        ORDER BY c.created_at ASC
        LIMIT $2
        FOR UPDATE OF c
        "#,
    )
    .bind(cooldown_days)
    .bind(limit)
    .fetch_all(conn)
    .await
}

pub async fn mark_settled(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE commissions SET status = 'available', settled_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn mark_cancelled(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE commissions SET status = 'cancelled', settled_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
