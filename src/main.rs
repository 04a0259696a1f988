mod admin;
mod api;
mod app;
mod common;
mod http_client;
mod model;
mod portal;
mod render;
mod session;

use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{AppState, create_app};
use model::{arg::Args, config::Config};

/// 过期会话清理间隔
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载 .env（不存在时忽略）
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config_path = args
        .config
        .unwrap_or_else(|| Config::default_config_path().to_string());
    let mut config = Config::load(&config_path)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());

    match config.config_path() {
        Some(path) => tracing::info!("已加载配置文件: {}", path.display()),
        None => tracing::info!("配置文件 {} 不存在，使用默认配置", config_path),
    }

    let state = AppState::from_config(&config)?;
    tracing::info!("后端 API: {}", state.portal.backend.base_url());

    let store = state.sessions.store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "已清理过期会话");
            }
        }
    });

    let app = create_app(state);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("启动 HTTP 服务器: http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
