//! 导出前置的订单清理守卫
//!
//! 批量删除订单前必须先按同一筛选条件导出一次。守卫只做
//! 逐字段精确比对；导出记录由调用端（运营后台会话）持有，
//! 清理成功后必须清掉，属于一次性令牌而非长期授权。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 订单筛选条件：导出与清理共用同一结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderFilter {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub status: Option<String>,
}

/// 守卫裁决，调用方据此给出具体的提示文案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CleanupVerdict {
    /// 筛选条件与最近一次导出完全一致，放行
    Allowed,
    /// 尚未导出过
    ExportRequired,
    /// 导出过，但条件不一致
    FilterMismatch,
}

/// 判定是否允许清理
pub fn check(requested: &OrderFilter, last_exported: Option<&OrderFilter>) -> CleanupVerdict {
    match last_exported {
        None => CleanupVerdict::ExportRequired,
        Some(exported) if exported == requested => CleanupVerdict::Allowed,
        Some(_) => CleanupVerdict::FilterMismatch,
    }
}

/// 布尔快捷判定
pub fn can_cleanup(requested: &OrderFilter, last_exported: Option<&OrderFilter>) -> bool {
    check(requested, last_exported) == CleanupVerdict::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> OrderFilter {
        OrderFilter {
            date_start: Some("2026-08-01".parse().unwrap()),
            date_end: Some("2026-08-31".parse().unwrap()),
            status: Some("completed".to_string()),
        }
    }

    #[test]
    fn exact_match_is_allowed() {
        let f = filter();
        assert_eq!(check(&f, Some(&f.clone())), CleanupVerdict::Allowed);
        assert!(can_cleanup(&f, Some(&f)));
    }

    #[test]
    fn no_export_yet_requires_export() {
        let f = filter();
        assert_eq!(check(&f, None), CleanupVerdict::ExportRequired);
        assert!(!can_cleanup(&f, None));
    }

    #[test]
    fn any_single_field_difference_blocks_cleanup() {
        let requested = filter();

        let mut exported = filter();
        exported.date_start = Some("2026-08-02".parse().unwrap());
        assert_eq!(check(&requested, Some(&exported)), CleanupVerdict::FilterMismatch);

        let mut exported = filter();
        exported.date_end = Some("2026-09-01".parse().unwrap());
        assert_eq!(check(&requested, Some(&exported)), CleanupVerdict::FilterMismatch);

        let mut exported = filter();
        exported.status = Some("pending".to_string());
        assert_eq!(check(&requested, Some(&exported)), CleanupVerdict::FilterMismatch);

        let mut exported = filter();
        exported.status = None;
        assert_eq!(check(&requested, Some(&exported)), CleanupVerdict::FilterMismatch);
    }

    #[test]
    fn all_none_filters_still_compare_exactly() {
        let open = OrderFilter {
            date_start: None,
            date_end: None,
            status: None,
        };
        assert_eq!(check(&open, Some(&open.clone())), CleanupVerdict::Allowed);
        assert_eq!(check(&open, Some(&filter())), CleanupVerdict::FilterMismatch);
    }
}
