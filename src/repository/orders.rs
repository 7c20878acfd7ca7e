use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::infrastructure::db::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OrderRow {
    pub id: Uuid,
    pub order_no: String,
    pub distributor_id: Option<Uuid>,
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 导出与清理共用的筛选条件。NULL 表示该维度不限，
/// date_end 为闭区间（含当天）
fn filter_sql(table_op: &str) -> String {
    format!(
        r#"
        {table_op} FROM orders
        WHERE ($1::date IS NULL OR created_at >= $1::date)
          AND ($2::date IS NULL OR created_at < $2::date + INTERVAL '1 day')
          AND ($3::text IS NULL OR status = $3)
        "#
    )
}

pub async fn list_for_export(
    pool: &PgPool,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
    status: Option<&str>,
) -> Result<Vec<OrderRow>, sqlx::Error> {
    let sql = format!(
        "{} ORDER BY created_at ASC",
        filter_sql("SELECT id, order_no, distributor_id, amount, status, created_at")
    );
    sqlx::query_as::<_, OrderRow>(&sql)
        .bind(date_start)
        .bind(date_end)
        .bind(status)
        .fetch_all(pool)
        .await
}

pub async fn delete_matching(
    pool: &PgPool,
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
    status: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let sql = filter_sql("DELETE");
    let result = sqlx::query(&sql)
        .bind(date_start)
        .bind(date_end)
        .bind(status)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
