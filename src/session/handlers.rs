//! 登录/登出处理器

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::provider::AuthError;
use super::router::{SESSION_COOKIE, SessionState};

/// 登录成功后的跳转地址
pub const DASHBOARD_PATH: &str = "/admin/dashboard";
pub const LOGIN_PATH: &str = "/login";

/// 登录表单
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoginView<'a> {
    email: &'a str,
    error: Option<String>,
}

/// GET /login
pub async fn login_page(State(state): State<SessionState>, jar: CookieJar) -> Response {
    if state.resolve(&jar).is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    state.renderer.page(
        StatusCode::OK,
        "login.html",
        &LoginView {
            email: "",
            error: None,
        },
    )
}

/// POST /login
pub async fn login(
    State(state): State<SessionState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim();
    match state.provider.sign_in(email, &form.password).await {
        Ok(token) => {
            let user_id = token.user_id.clone();
            let session_id = state.store.create(token);
            tracing::info!(
                user_id = %user_id,
                active_sessions = state.store.len(),
                "管理员登录成功"
            );
            let jar = jar.add(state.session_cookie(session_id));
            (jar, Redirect::to(DASHBOARD_PATH)).into_response()
        }
        Err(e) => {
            tracing::warn!("管理员登录失败: {}", e);
            let (status, message) = login_error(&e);
            state.renderer.page(
                status,
                "login.html",
                &LoginView {
                    email,
                    error: Some(message),
                },
            )
        }
    }
}

fn login_error(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password.".to_string(),
        ),
        AuthError::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Sign-in is not configured.".to_string(),
        ),
        other => (StatusCode::BAD_GATEWAY, format!("Sign-in failed: {}", other)),
    }
}

/// POST /logout
///
/// 登出失败只记录日志，始终跳转到登录页
pub async fn logout(State(state): State<SessionState>, jar: CookieJar) -> Response {
    match jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        Some(session_id) => {
            if !state.store.remove(&session_id) {
                tracing::warn!("登出时会话不存在或已过期");
            }
        }
        None => tracing::warn!("登出请求未携带会话 Cookie"),
    }

    let jar = jar.remove(state.removal_cookie());
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}
