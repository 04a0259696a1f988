//! 应用组装
//!
//! Input: Config
//! Output: 完整的 axum Router
//! Pos: 门户、登录、管理后台、静态资源路由的合并点

use std::sync::Arc;

use axum::{Router, response::Redirect, routing::get};
use tower_http::trace::TraceLayer;

use crate::admin::{AdminService, AdminState, create_admin_router};
use crate::api::{BackendClient, RetryPolicy};
use crate::common::non_blank;
use crate::http_client::build_client;
use crate::model::config::Config;
use crate::portal::{PortalState, create_portal_router};
use crate::render::{Renderer, create_assets_router};
use crate::session::{
    AuthProvider, FirebaseAuth, LOGIN_PATH, SessionState, SessionStore, create_session_router,
};

/// 各模块共享状态
#[derive(Clone)]
pub struct AppState {
    pub portal: PortalState,
    pub sessions: SessionState,
    pub admin: AdminState,
}

impl AppState {
    /// 根据配置构建全部依赖
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_client(config.proxy_url.as_deref(), config.request_timeout())?;
        let retry = RetryPolicy::new(
            config.max_retries,
            std::time::Duration::from_millis(config.retry_base_delay_ms),
        );
        let backend = BackendClient::new(http.clone(), config.api_base(), retry);

        let provider: Arc<dyn AuthProvider> = Arc::new(FirebaseAuth::new(
            http,
            config.firebase_api_key.clone(),
            config.identity_base_url.clone(),
            config.secure_token_base_url.clone(),
        ));
        if non_blank(config.firebase_api_key.as_deref()).is_none() {
            tracing::warn!("未配置 firebaseApiKey，管理员登录不可用");
        }

        Self::new(backend, provider, config)
    }

    pub fn new(
        backend: BackendClient,
        provider: Arc<dyn AuthProvider>,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let renderer = Renderer::shared()?;
        let store = Arc::new(SessionStore::new(config.session_ttl()));

        Ok(Self {
            portal: PortalState::new(backend.clone(), renderer.clone()),
            sessions: SessionState::new(
                store,
                provider,
                renderer.clone(),
                config.secure_cookies,
            ),
            admin: AdminState::new(AdminService::new(backend), renderer),
        })
    }
}

/// 创建完整应用路由
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(LOGIN_PATH) }))
        .route("/healthz", get(|| async { "ok" }))
        .merge(create_portal_router(state.portal))
        .merge(create_session_router(state.sessions.clone()))
        .merge(create_admin_router(state.admin, state.sessions))
        .nest("/assets", create_assets_router())
        .layer(TraceLayer::new_for_http())
}
