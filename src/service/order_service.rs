//! 订单导出与归档清理
//!
//! 清理前必须先导出完全相同的筛选条件：导出接口返回数据的同时
//! 由客户端持有本次筛选条件作为一次性凭证，清理接口比对凭证与
//! 请求条件一致才放行，清理成功后凭证作废。

use tracing::{info, warn};

use crate::domain::cleanup_guard::{self, CleanupVerdict, OrderFilter};
use crate::error::AppError;
use crate::infrastructure::db::PgPool;
use crate::repository::orders::{self, OrderRow};

pub async fn export_orders(pool: &PgPool, filter: &OrderFilter) -> Result<Vec<OrderRow>, AppError> {
    let rows = orders::list_for_export(
        pool,
        filter.date_start,
        filter.date_end,
        filter.status.as_deref(),
    )
    .await?;
    info!(count = rows.len(), "Orders exported");
    Ok(rows)
}

/// 清理归档订单，返回删除行数。未导出或条件不一致一律拒绝
pub async fn cleanup_orders(
    pool: &PgPool,
    requested: &OrderFilter,
    last_exported: Option<&OrderFilter>,
) -> Result<u64, AppError> {
    match cleanup_guard::check(requested, last_exported) {
        CleanupVerdict::Allowed => {}
        CleanupVerdict::ExportRequired => {
            warn!("Cleanup rejected: no prior export");
            return Err(AppError::validation_failed(
                "Orders must be exported before cleanup",
            ));
        }
        CleanupVerdict::FilterMismatch => {
            warn!("Cleanup rejected: filter does not match last export");
            return Err(AppError::validation_failed(
                "Cleanup filter must match the last exported filter exactly",
            ));
        }
    }

    let deleted = orders::delete_matching(
        pool,
        requested.date_start,
        requested.date_end,
        requested.status.as_deref(),
    )
    .await?;
    info!(deleted, "Orders cleaned up");
    Ok(deleted)
}
