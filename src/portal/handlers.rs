//! 门户 HTTP 处理器

use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::dialer::emergency_call;
use super::router::PortalState;
use super::state::AccessFlow;
use super::view::{PortalView, portal_path};

/// 解锁表单
#[derive(Debug, Deserialize)]
pub struct UnlockForm {
    #[serde(default)]
    pub pin: String,
}

/// GET /portal/{userId}
pub async fn show_portal(
    State(state): State<PortalState>,
    Path(user_id): Path<String>,
) -> Response {
    let mut flow = AccessFlow::new(user_id);
    flow.load(&state.backend).await;
    render(&state, &flow)
}

/// POST /portal/{userId}/unlock
///
/// 每个请求都是新的页面生命周期：先重新获取公开信息，再提交 PIN。
/// 无法解析的表单按空 PIN 处理，由后端拒绝并在页面内提示
pub async fn unlock(
    State(state): State<PortalState>,
    Path(user_id): Path<String>,
    form: Result<Form<UnlockForm>, FormRejection>,
) -> Response {
    let pin = match form {
        Ok(Form(form)) => form.pin,
        Err(rejection) => {
            tracing::debug!(user_id = %user_id, "解锁表单无法解析: {}", rejection);
            String::new()
        }
    };

    let mut flow = AccessFlow::new(user_id);
    flow.load(&state.backend).await;
    flow.unlock(&state.backend, &pin).await;
    render(&state, &flow)
}

/// GET /portal/{userId}/call
///
/// 有紧急联系人时重定向到 `tel:`，否则回到门户页面
pub async fn call_emergency(
    State(state): State<PortalState>,
    Path(user_id): Path<String>,
) -> Response {
    let mut flow = AccessFlow::new(user_id);
    flow.load(&state.backend).await;

    let location = emergency_call(flow.state().profile()).and_then(|t| t.to_header_value());
    match location {
        Some(location) => {
            tracing::info!(user_id = %flow.user_id(), "发起紧急联系人拨号");
            (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
        }
        None => Redirect::to(&portal_path(flow.user_id())).into_response(),
    }
}

fn render(state: &PortalState, flow: &AccessFlow) -> Response {
    let mut response = state
        .renderer
        .page(StatusCode::OK, "portal.html", &PortalView::from_flow(flow));
    // 私密数据仅在本次响应中存在，禁止缓存
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
