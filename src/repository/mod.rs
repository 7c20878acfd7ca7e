//! 数据访问层：SQL 全部收敛在这里，服务层只见类型化的行结构

pub mod commissions;
pub mod distributors;
pub mod orders;
pub mod risk_config;
pub mod security_alerts;
pub mod withdrawals;
