use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::infrastructure::db::PgPool;

/// 风控配置行：类型化 key/value，category 区分
/// withdrawal（业务开关/限额）、risk_weight（因子权重）、risk_threshold（分档阈值）
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiskConfigRow {
    pub key: String,
    pub value: String,
    pub value_type: String,
    pub category: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConfigDefault {
    pub key: &'static str,
    pub value: &'static str,
    pub value_type: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// 幂等播种：已存在的 key 不覆盖，运营改过的值不会被重启冲掉
pub async fn insert_if_absent(
    pool: &PgPool,
    def: &ConfigDefault,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO risk_config (key, value, value_type, category, description, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(def.key)
    .bind(def.value)
    .bind(def.value_type)
    .bind(def.category)
    .bind(def.description)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get(pool: &PgPool, key: &str) -> Result<Option<RiskConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, RiskConfigRow>(
        "SELECT key, value, value_type, category, description, updated_at \
         FROM risk_config WHERE key = $1",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

pub async fn get_all(pool: &PgPool) -> Result<Vec<RiskConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, RiskConfigRow>(
        "SELECT key, value, value_type, category, description, updated_at \
         FROM risk_config ORDER BY category, key",
    )
    .fetch_all(pool)
    .await
}

pub async fn list_by_category(
    pool: &PgPool,
    category: &str,
) -> Result<Vec<RiskConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, RiskConfigRow>(
        "SELECT key, value, value_type, category, description, updated_at \
         FROM risk_config WHERE category = $1 ORDER BY key",
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// 只更新已播种的 key，未知 key 返回 None 由服务层报 404
pub async fn update_value(
    pool: &PgPool,
    key: &str,
    value: &str,
) -> Result<Option<RiskConfigRow>, sqlx::Error> {
    sqlx::query_as::<_, RiskConfigRow>(
        r#"
        UPDATE risk_config SET value = $2, updated_at = NOW()
        WHERE key = $1
        RETURNING key, value, value_type, category, description, updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .fetch_optional(pool)
    .await
}
