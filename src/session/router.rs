//! 登录/登出路由配置

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::handlers::{login, login_page, logout};
use super::provider::AuthProvider;
use super::store::{SessionHandle, SessionStore};
use crate::render::Renderer;

/// 会话 Cookie 名称
pub const SESSION_COOKIE: &str = "nfc_portal_session";

/// 会话共享状态
#[derive(Clone)]
pub struct SessionState {
    pub store: Arc<SessionStore>,
    pub provider: Arc<dyn AuthProvider>,
    pub renderer: Arc<Renderer>,
    pub secure_cookies: bool,
}

impl SessionState {
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn AuthProvider>,
        renderer: Arc<Renderer>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            store,
            provider,
            renderer,
            secure_cookies,
        }
    }

    /// 根据 Cookie 解析当前会话
    pub fn resolve(&self, jar: &CookieJar) -> Option<SessionHandle> {
        let session_id = jar.get(SESSION_COOKIE)?.value();
        let session = self.store.get(session_id)?;
        Some(SessionHandle::new(
            session_id,
            session,
            self.store.clone(),
            self.provider.clone(),
        ))
    }

    /// 构建会话 Cookie
    pub fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.store.ttl().as_secs()).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(time::Duration::seconds(max_age))
            .build()
    }

    /// 构建用于清除会话的 Cookie
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

/// 创建登录相关路由
///
/// # 端点
/// - `GET /login` - 登录页面
/// - `POST /login` - 邮箱密码登录
/// - `POST /logout` - 登出
pub fn create_session_router(state: SessionState) -> Router {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .with_state(state)
}
