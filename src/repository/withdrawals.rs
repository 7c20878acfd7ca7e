use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::infrastructure::db::PgPool;

/// 提现记录行。status 在库里存 TEXT，出入口统一走
/// `WithdrawalStatus::parse` / `as_str`，服务层只见枚举。
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WithdrawalRecord {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub amount: Decimal,
    pub fee: Decimal,
    pub actual_amount: Decimal,
    pub status: String,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_account_name: String,
    pub is_auto_approved: bool,
    pub auto_approved_at: Option<DateTime<Utc>>,
    pub risk_score: Option<i64>,
    pub risk_check_result: Option<serde_json::Value>,
    pub rejected_reason: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct NewWithdrawal {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub amount: Decimal,
    pub fee: Decimal,
    pub actual_amount: Decimal,
    pub status: String,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_account_name: String,
    pub is_auto_approved: bool,
    pub auto_approved_at: Option<DateTime<Utc>>,
    pub risk_score: i64,
    pub risk_check_result: serde_json::Value,
    pub processed_at: Option<DateTime<Utc>>,
}

const ALL_COLUMNS: &str = "id, distributor_id, amount, fee, actual_amount, status, \
     bank_name, bank_account, bank_account_name, is_auto_approved, auto_approved_at, \
     risk_score, risk_check_result, rejected_reason, transaction_id, \
     created_at, processed_at, completed_at";

/// 插入新记录（必须在创建事务内执行，与限额检查同一隔离单元）
pub async fn insert(
    conn: &mut sqlx::PgConnection,
    w: &NewWithdrawal,
) -> Result<WithdrawalRecord, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO withdrawal_requests
            (id, distributor_id, amount, fee, actual_amount, status,
             bank_name, bank_account, bank_account_name,
             is_auto_approved, auto_approved_at, risk_score, risk_check_result, processed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {ALL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, WithdrawalRecord>(&sql)
        .bind(w.id)
        .bind(w.distributor_id)
        .bind(w.amount)
        .bind(w.fee)
        .bind(w.actual_amount)
        .bind(&w.status)
        .bind(&w.bank_name)
        .bind(&w.bank_account)
        .bind(&w.bank_account_name)
        .bind(w.is_auto_approved)
        .bind(w.auto_approved_at)
        .bind(w.risk_score)
        .bind(&w.risk_check_result)
        .bind(w.processed_at)
        .fetch_one(conn)
        .await
}

pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WithdrawalRecord>, sqlx::Error> {
    let sql = format!("SELECT {ALL_COLUMNS} FROM withdrawal_requests WHERE id = $1");
    sqlx::query_as::<_, WithdrawalRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// 操作员转换前锁行，避免并发审批同一笔
pub async fn get_by_id_for_update(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
) -> Result<Option<WithdrawalRecord>, sqlx::Error> {
    let sql = format!("SELECT {ALL_COLUMNS} FROM withdrawal_requests WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, WithdrawalRecord>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

pub async fn list(
    pool: &PgPool,
    distributor_id: Option<Uuid>,
    status: Option<String>,
    limit: i64,
    offset: i64,
) -> Result<Vec<WithdrawalRecord>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {ALL_COLUMNS} FROM withdrawal_requests
        WHERE ($1::uuid IS NULL OR distributor_id = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, WithdrawalRecord>(&sql)
        .bind(distributor_id)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

/// 历史画像聚合（在创建事务内、锁定分销商行之后执行，
/// 保证同一分销商的并发创建读不到脏的"今日笔数"）
#[derive(Debug, FromRow)]
pub struct HistoryAggregates {
    pub today_count: i64,
    pub today_amount: Decimal,
    pub month_count: i64,
    pub month_amount: Decimal,
    pub average_amount: Option<Decimal>,
    pub prior_rejected_count: i64,
}

pub async fn history_aggregates(
    conn: &mut sqlx::PgConnection,
    distributor_id: Uuid,
) -> Result<HistoryAggregates, sqlx::Error> {
    sqlx::query_as::<_, HistoryAggregates>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE created_at >= DATE_TRUNC('day', NOW())
                               AND status <> 'rejected') AS today_count,
            COALESCE(SUM(amount) FILTER (WHERE created_at >= DATE_TRUNC('day', NOW())
                                           AND status <> 'rejected'), 0) AS today_amount,
            COUNT(*) FILTER (WHERE created_at >= DATE_TRUNC('month', NOW())
                               AND status <> 'rejected') AS month_count,
            COALESCE(SUM(amount) FILTER (WHERE created_at >= DATE_TRUNC('month', NOW())
                                           AND status <> 'rejected'), 0) AS month_amount,
            AVG(amount) FILTER (WHERE status = 'completed') AS average_amount,
            COUNT(*) FILTER (WHERE status = 'rejected') AS prior_rejected_count
        FROM withdrawal_requests
        WHERE distributor_id = $1
        "#,
    )
    .bind(distributor_id)
    .fetch_one(conn)
    .await
}

/// 状态转换落库：一次 UPDATE 带齐审计字段
pub async fn apply_transition(
    conn: &mut sqlx::PgConnection,
    id: Uuid,
    new_status: &str,
    processed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    rejected_reason: Option<&str>,
    transaction_id: Option<&str>,
) -> Result<WithdrawalRecord, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE withdrawal_requests
        SET status = $2,
            processed_at = COALESCE($3, processed_at),
            completed_at = COALESCE($4, completed_at),
            rejected_reason = COALESCE($5, rejected_reason),
            transaction_id = COALESCE($6, transaction_id)
        WHERE id = $1
        RETURNING {ALL_COLUMNS}
        "#
    );
    sqlx::query_as::<_, WithdrawalRecord>(&sql)
        .bind(id)
        .bind(new_status)
        .bind(processed_at)
        .bind(completed_at)
        .bind(rejected_reason)
        .bind(transaction_id)
        .fetch_one(conn)
        .await
}
