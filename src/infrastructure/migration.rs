//! 数据库迁移管理模块
//! 迁移以编号步骤内嵌在代码中，启动时幂等执行并记录版本。

use anyhow::{Context, Result};
use sqlx::Row;

use super::db::PgPool;

/// 初始化迁移表
pub async fn init_migration_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migration table")?;

    Ok(())
}

async fn is_applied(pool: &PgPool, version: i64) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) FROM schema_migrations WHERE version = $1")
        .bind(version)
        .fetch_one(pool)
        .await?;
    let count: i64 = row.get(0);
    Ok(count > 0)
}

async fn record_migration(pool: &PgPool, version: i64, name: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO schema_migrations (version, name) VALUES ($1, $2) ON CONFLICT (version) DO NOTHING",
    )
    .bind(version)
    .bind(name)
    .execute(pool)
    .await
    .context("Failed to record migration")?;

    Ok(())
}

/// 执行全部迁移（幂等）
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    init_migration_table(pool).await?;

    let migrations: &[(i64, &str, &[&str])] = &[
        (
            1,
            "create_distributors",
            &[r#"
            CREATE TABLE IF NOT EXISTS distributors (
                id UUID PRIMARY KEY,
                identity_verified BOOLEAN NOT NULL DEFAULT FALSE,
                available_balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
                pending_commission NUMERIC(18, 2) NOT NULL DEFAULT 0,
                withdrawn_amount NUMERIC(18, 2) NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#],
        ),
        (
            2,
            "create_withdrawal_requests",
            &[
                r#"
                CREATE TABLE IF NOT EXISTS withdrawal_requests (
                    id UUID PRIMARY KEY,
                    distributor_id UUID NOT NULL REFERENCES distributors(id),
                    amount NUMERIC(18, 2) NOT NULL,
                    fee NUMERIC(18, 2) NOT NULL,
                    actual_amount NUMERIC(18, 2) NOT NULL,
                    status TEXT NOT NULL,
                    bank_name TEXT NOT NULL,
                    bank_account TEXT NOT NULL,
                    bank_account_name TEXT NOT NULL,
                    is_auto_approved BOOLEAN NOT NULL DEFAULT FALSE,
                    auto_approved_at TIMESTAMPTZ,
                    risk_score BIGINT,
                    risk_check_result JSONB,
                    rejected_reason TEXT,
                    transaction_id TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    processed_at TIMESTAMPTZ,
                    completed_at TIMESTAMPTZ
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_withdrawals_distributor_created
                 ON withdrawal_requests (distributor_id, created_at)",
                "CREATE INDEX IF NOT EXISTS idx_withdrawals_status
                 ON withdrawal_requests (status)",
            ],
        ),
        (
            3,
            "create_risk_config",
            &[r#"
            CREATE TABLE IF NOT EXISTS risk_config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                value_type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#],
        ),
        (
            4,
            "create_security_alerts",
            &[r#"
            CREATE TABLE IF NOT EXISTS security_alerts (
                id UUID PRIMARY KEY,
                distributor_id UUID NOT NULL,
                withdrawal_id UUID,
                alert_type TEXT NOT NULL,
                severity TEXT NOT NULL,
                detail JSONB NOT NULL,
                status TEXT NOT NULL DEFAULT 'open',
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#],
        ),
        (
            5,
            "create_orders_and_commissions",
            &[
                r#"
                CREATE TABLE IF NOT EXISTS orders (
                    id UUID PRIMARY KEY,
                    order_no TEXT NOT NULL UNIQUE,
                    distributor_id UUID,
                    amount NUMERIC(18, 2) NOT NULL,
                    status TEXT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
                )
                "#,
                r#"
                CREATE TABLE IF NOT EXISTS commissions (
                    id UUID PRIMARY KEY,
                    distributor_id UUID NOT NULL REFERENCES distributors(id),
                    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                    amount NUMERIC(18, 2) NOT NULL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
                    settled_at TIMESTAMPTZ
                )
                "#,
                "CREATE INDEX IF NOT EXISTS idx_commissions_status_created
                 ON commissions (status, created_at)",
            ],
        ),
    ];

    for (version, name, statements) in migrations {
        if is_applied(pool, *version).await? {
            continue;
        }
        for sql in statements.iter() {
            sqlx::query(sql)
                .execute(pool)
                .await
                .with_context(|| format!("Migration {} ({}) failed", version, name))?;
        }
        record_migration(pool, *version, name).await?;
        tracing::info!(version = version, name = name, "Applied migration");
    }

    Ok(())
}
