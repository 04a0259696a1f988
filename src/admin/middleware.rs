//! 管理后台中间件

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::service::AdminService;
use crate::render::Renderer;
use crate::session::{LOGIN_PATH, SessionState};

/// 管理后台共享状态
#[derive(Clone)]
pub struct AdminState {
    pub service: Arc<AdminService>,
    pub renderer: Arc<Renderer>,
}

impl AdminState {
    pub fn new(service: AdminService, renderer: Arc<Renderer>) -> Self {
        Self {
            service: Arc::new(service),
            renderer,
        }
    }
}

/// 会话守卫
///
/// 有有效会话时把 `SessionHandle` 注入请求扩展，否则重定向到登录页
pub async fn session_guard(
    State(sessions): State<SessionState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match sessions.resolve(&jar) {
        Some(handle) => {
            request.extensions_mut().insert(handle);
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "未登录访问管理后台，重定向到登录页");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}
