use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::infrastructure::db::PgPool;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityAlertRow {
    pub id: Uuid,
    pub distributor_id: Uuid,
    pub withdrawal_id: Option<Uuid>,
    pub alert_type: String,
    pub severity: String,
    pub detail: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub async fn insert(
    conn: &mut sqlx::PgConnection,
    distributor_id: Uuid,
    withdrawal_id: Option<Uuid>,
    alert_type: &str,
    severity: &str,
    detail: serde_json::Value,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO security_alerts (id, distributor_id, withdrawal_id, alert_type, severity, detail)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(distributor_id)
    .bind(withdrawal_id)
    .bind(alert_type)
    .bind(severity)
    .bind(detail)
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn list_open(pool: &PgPool, limit: i64) -> Result<Vec<SecurityAlertRow>, sqlx::Error> {
    sqlx::query_as::<_, SecurityAlertRow>(
        "SELECT id, distributor_id, withdrawal_id, alert_type, severity, detail, status, created_at \
         FROM security_alerts WHERE status = 'open' ORDER BY created_at DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
