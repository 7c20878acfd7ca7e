//! 风控配置服务：默认值播种、读取快照、运营更新
//!
//! 所有可调参数（业务开关/限额、因子权重、分档阈值）统一落在
//! risk_config 表，评估前加载为 `RiskConfigSnapshot` 传入纯函数，
//! 缺 key 或类型错直接报 ConfigNotInitialized，不做兜底默认。

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::info;

use crate::domain::risk::{RiskConfigSnapshot, RISK_FACTORS};
use crate::error::AppError;
use crate::infrastructure::db::PgPool;
use crate::repository::risk_config::{self, ConfigDefault, RiskConfigRow};

pub const CATEGORY_WITHDRAWAL: &str = "withdrawal";
pub const CATEGORY_RISK_WEIGHT: &str = "risk_weight";
pub const CATEGORY_RISK_THRESHOLD: &str = "risk_threshold";

const WEIGHT_PREFIX: &str = "weight_";

/// 出厂默认值。播种幂等，已改过的值不会被覆盖
pub const CONFIG_DEFAULTS: &[ConfigDefault] = &[
    ConfigDefault { key: "fee_rate", value: "0.01", value_type: "decimal", category: CATEGORY_WITHDRAWAL, description: "提现手续费率" },
    ConfigDefault { key: "min_withdrawal_amount", value: "10", value_type: "decimal", category: CATEGORY_WITHDRAWAL, description: "单笔最小提现金额" },
    ConfigDefault { key: "auto_approve_enabled", value: "true", value_type: "bool", category: CATEGORY_WITHDRAWAL, description: "自动审批开关" },
    ConfigDefault { key: "auto_approve_max_amount", value: "5000", value_type: "decimal", category: CATEGORY_WITHDRAWAL, description: "自动审批单笔上限" },
    ConfigDefault { key: "min_account_age_days", value: "30", value_type: "int", category: CATEGORY_WITHDRAWAL, description: "自动审批最低账龄（天）" },
    ConfigDefault { key: "require_identity_verification", value: "true", value_type: "bool", category: CATEGORY_WITHDRAWAL, description: "自动审批是否要求实名" },
    ConfigDefault { key: "max_requests_per_day", value: "3", value_type: "int", category: CATEGORY_WITHDRAWAL, description: "单日最大提现笔数" },
    ConfigDefault { key: "max_amount_per_day", value: "10000", value_type: "decimal", category: CATEGORY_WITHDRAWAL, description: "单日最大提现总额" },
    ConfigDefault { key: "max_amount_per_month", value: "50000", value_type: "decimal", category: CATEGORY_WITHDRAWAL, description: "单月最大提现总额" },
    ConfigDefault { key: "settlement_cooldown_days", value: "15", value_type: "int", category: CATEGORY_WITHDRAWAL, description: "佣金结算冷却期（天）" },
    ConfigDefault { key: "weight_new_account", value: "10", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "新账户因子权重" },
    ConfigDefault { key: "weight_unverified_identity", value: "8", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "未实名因子权重" },
    ConfigDefault { key: "weight_large_amount", value: "10", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "大额因子权重" },
    ConfigDefault { key: "weight_high_frequency", value: "8", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "高频因子权重" },
    ConfigDefault { key: "weight_daily_amount", value: "6", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "单日累计金额因子权重" },
    ConfigDefault { key: "weight_monthly_amount", value: "6", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "单月累计金额因子权重" },
    ConfigDefault { key: "weight_amount_spike", value: "8", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "金额突增因子权重" },
    ConfigDefault { key: "weight_prior_rejection", value: "12", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "历史拒绝因子权重" },
    ConfigDefault { key: "weight_night_hours", value: "4", value_type: "int", category: CATEGORY_RISK_WEIGHT, description: "异常时段因子权重" },
    ConfigDefault { key: "risk_threshold_medium", value: "10", value_type: "int", category: CATEGORY_RISK_THRESHOLD, description: "中风险分数下界（含）" },
    ConfigDefault { key: "risk_threshold_high", value: "30", value_type: "int", category: CATEGORY_RISK_THRESHOLD, description: "高风险分数下界（含）" },
];

/// 启动时播种默认配置，返回新插入的条数
pub async fn initialize_defaults(pool: &PgPool) -> Result<usize, AppError> {
    let mut inserted = 0;
    for def in CONFIG_DEFAULTS {
        if risk_config::insert_if_absent(pool, def).await? {
            inserted += 1;
        }
    }
    if inserted > 0 {
        info!("Risk config defaults seeded: {} new entries", inserted);
    }
    Ok(inserted)
}

pub async fn list_config(
    pool: &PgPool,
    category: Option<&str>,
) -> Result<Vec<RiskConfigRow>, AppError> {
    let rows = match category {
        Some(c) => risk_config::list_by_category(pool, c).await?,
        None => risk_config::get_all(pool).await?,
    };
    Ok(rows)
}

/// 运营更新配置值。按行上记录的 value_type 校验，
/// 权重与阈值不允许负数
pub async fn update_config(
    pool: &PgPool,
    key: &str,
    value: &str,
) -> Result<RiskConfigRow, AppError> {
    let existing = risk_config::get(pool, key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Config key '{}' not found", key)))?;

    match existing.value_type.as_str() {
        "int" => {
            let n: i64 = value.parse().map_err(|_| {
                AppError::validation_failed(format!("Config '{}' expects an integer", key))
            })?;
            if n < 0 {
                return Err(AppError::validation_failed(format!(
                    "Config '{}' must not be negative",
                    key
                )));
            }
        }
        "decimal" => {
            let d: Decimal = value.parse().map_err(|_| {
                AppError::validation_failed(format!("Config '{}' expects a decimal", key))
            })?;
            if d < Decimal::ZERO {
                return Err(AppError::validation_failed(format!(
                    "Config '{}' must not be negative",
                    key
                )));
            }
        }
        "bool" => {
            if value != "true" && value != "false" {
                return Err(AppError::validation_failed(format!(
                    "Config '{}' expects true or false",
                    key
                )));
            }
        }
        other => {
            return Err(AppError::internal(format!(
                "Config '{}' has unknown value_type '{}'",
                key, other
            )));
        }
    }

    let updated = risk_config::update_value(pool, key, value)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Config key '{}' not found", key)))?;
    info!("Risk config updated: {} = {}", key, value);
    Ok(updated)
}

fn require<'a>(
    map: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, AppError> {
    map.get(key)
        .map(String::as_str)
        .ok_or_else(|| AppError::config_not_initialized(key))
}

fn require_decimal(map: &HashMap<String, String>, key: &'static str) -> Result<Decimal, AppError> {
    require(map, key)?
        .parse()
        .map_err(|_| AppError::config_not_initialized(key))
}

fn require_int(map: &HashMap<String, String>, key: &'static str) -> Result<i64, AppError> {
    require(map, key)?
        .parse()
        .map_err(|_| AppError::config_not_initialized(key))
}

fn require_bool(map: &HashMap<String, String>, key: &'static str) -> Result<bool, AppError> {
    match require(map, key)? {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(AppError::config_not_initialized(key)),
    }
}

/// 加载完整快照。任何必需 key 缺失或解析失败都是硬错误，
/// 提现链路宁可失败也不能按猜测的参数放行
pub async fn load_snapshot(pool: &PgPool) -> Result<RiskConfigSnapshot, AppError> {
    let rows = risk_config::get_all(pool).await?;
    let map: HashMap<String, String> = rows.into_iter().map(|r| (r.key, r.value)).collect();

    let mut weights = BTreeMap::new();
    for factor in RISK_FACTORS {
        let key = format!("{}{}", WEIGHT_PREFIX, factor.name);
        let value = map
            .get(&key)
            .ok_or_else(|| AppError::config_not_initialized(factor.name))?;
        let weight: i64 = value
            .parse()
            .map_err(|_| AppError::config_not_initialized(factor.name))?;
        weights.insert(factor.name.to_string(), weight);
    }

    Ok(RiskConfigSnapshot {
        fee_rate: require_decimal(&map, "fee_rate")?,
        min_withdrawal_amount: require_decimal(&map, "min_withdrawal_amount")?,
        auto_approve_enabled: require_bool(&map, "auto_approve_enabled")?,
        auto_approve_max_amount: require_decimal(&map, "auto_approve_max_amount")?,
        min_account_age_days: require_int(&map, "min_account_age_days")?,
        require_identity_verification: require_bool(&map, "require_identity_verification")?,
        max_requests_per_day: require_int(&map, "max_requests_per_day")?,
        max_amount_per_day: require_decimal(&map, "max_amount_per_day")?,
        max_amount_per_month: require_decimal(&map, "max_amount_per_month")?,
        settlement_cooldown_days: require_int(&map, "settlement_cooldown_days")?,
        medium_threshold: require_int(&map, "risk_threshold_medium")?,
        high_threshold: require_int(&map, "risk_threshold_high")?,
        weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_risk_factor() {
        for factor in RISK_FACTORS {
            let key = format!("{}{}", WEIGHT_PREFIX, factor.name);
            assert!(
                CONFIG_DEFAULTS.iter().any(|d| d.key == key),
                "missing default weight for factor {}",
                factor.name
            );
        }
    }

    #[test]
    fn default_keys_are_unique() {
        let mut keys: Vec<&str> = CONFIG_DEFAULTS.iter().map(|d| d.key).collect();
        keys.sort();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }
}
