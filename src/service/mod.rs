//! 业务服务层：编排事务与副作用，规则判定交给 domain 纯函数

pub mod commission_service;
pub mod order_service;
pub mod risk_config_service;
pub mod withdrawal_service;
