//! 管理后台 HTTP 处理器

use axum::{
    Extension,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};

use super::middleware::AdminState;
use super::types::{DashboardOutcome, DashboardView};
use crate::session::SessionHandle;

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AdminState>,
    session: Option<Extension<SessionHandle>>,
) -> Response {
    let session = session.map(|Extension(handle)| handle);
    let outcome = state.service.load_users(session.as_ref()).await;

    let status = match outcome {
        DashboardOutcome::AuthRequired => StatusCode::UNAUTHORIZED,
        _ => StatusCode::OK,
    };
    let view = DashboardView::new(&outcome, session.as_ref().and_then(|s| s.email()));
    let mut response = state.renderer.page(status, "dashboard.html", &view);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
