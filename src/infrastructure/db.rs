//! SQLx Postgres 连接池初始化与健康检查
//!
//! 用法：
//! let pool = init_pool(&env::var("DATABASE_URL")?).await?;
//! health_check(&pool).await?;

use std::{env, time::Duration};

pub type PgPool = sqlx::Pool<sqlx::Postgres>;

/// 初始化连接池
///
/// 连接池参数全部可用环境变量覆盖，默认值按开发环境取小。
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let max_conns = env::var("DB_MAX_CONNS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= 200)
        .unwrap_or(16);
    let min_conns = env::var("DB_MIN_CONNS")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&n| n > 0 && n <= max_conns)
        .unwrap_or(2);
    let acquire_secs = env::var("DB_ACQ_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5);
    let idle_secs = env::var("DB_IDLE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(300);
    let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1800);

    let pool_opts = sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_conns)
        .min_connections(min_conns)
        .acquire_timeout(Duration::from_secs(acquire_secs))
        .idle_timeout(Duration::from_secs(idle_secs))
        .max_lifetime(Duration::from_secs(max_lifetime_secs))
        .test_before_acquire(true);

    let pool = pool_opts.connect(database_url).await.map_err(|e| {
        tracing::error!("Failed to connect to Postgres: {}", e);
        e
    })?;

    // 验证连接
    health_check(&pool).await?;

    Ok(pool)
}

/// 健康检查：一条最小查询验证连接可用
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    let _: (chrono::DateTime<chrono::Utc>,) = sqlx::query_as("SELECT CURRENT_TIMESTAMP")
        .fetch_one(pool)
        .await?;
    Ok(())
}
