//! mallcore 主入口
//! 分销提现风控与审批服务

use std::sync::Arc;

use anyhow::Result;
use mallcore::{api, app_state::AppState, config::Config, infrastructure, service};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载环境变量
    dotenvy::dotenv().ok();

    // 1.5 加载配置文件（如果存在 CONFIG_PATH）
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = Config::from_env_and_file(config_path.as_deref())?;
    if std::env::var("JWT_SECRET").is_err() && !config.jwt.secret.is_empty() {
        std::env::set_var("JWT_SECRET", &config.jwt.secret);
    }
    config.validate()?;

    // 2. 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mallcore=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting mallcore withdrawal risk service");

    // 3. 连接数据库
    let pool = infrastructure::db::init_pool(&config.database.url).await?;
    tracing::info!("✅ Database connected");

    // 4. 运行数据库迁移
    if std::env::var("SKIP_MIGRATIONS").is_err() {
        infrastructure::migration::run_migrations(&pool).await?;
        tracing::info!("✅ Database migrations completed");
    } else {
        tracing::info!("⏭️ Database migrations skipped (SKIP_MIGRATIONS=1)");
    }

    // 5. 播种风控默认配置（幂等）
    let seeded = service::risk_config_service::initialize_defaults(&pool).await?;
    tracing::info!("✅ Risk config ready ({} defaults seeded)", seeded);

    // 6. 初始化应用状态并启动 HTTP 服务
    let bind_addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(pool, Arc::new(config)));
    let app = api::routes(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("✅ Listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
