//! 管理后台路由配置

use axum::{Router, middleware, routing::get};

use super::{
    handlers::dashboard,
    middleware::{AdminState, session_guard},
};
use crate::session::SessionState;

/// 创建管理后台路由
///
/// # 端点
/// - `GET /admin/dashboard` - 用户列表
///
/// # 认证
/// 需要有效的管理员会话 Cookie，否则重定向到 `/login`
pub fn create_admin_router(state: AdminState, sessions: SessionState) -> Router {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .layer(middleware::from_fn_with_state(sessions, session_guard))
        .with_state(state)
}
