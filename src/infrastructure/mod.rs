//! 基础设施模块：数据库连接池、迁移、JWT

pub mod db;
pub mod jwt;
pub mod migration;
