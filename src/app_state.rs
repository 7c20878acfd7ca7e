use std::sync::Arc;

use crate::{config::Config, infrastructure::db::PgPool};

/// 应用状态
/// 包含所有共享资源
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Arc<Config>) -> Self {
        Self { pool, config }
    }
}
