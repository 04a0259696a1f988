//! 门户路由配置

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{call_emergency, show_portal, unlock};
use crate::api::BackendClient;
use crate::render::Renderer;

/// 门户共享状态
#[derive(Clone)]
pub struct PortalState {
    pub backend: BackendClient,
    pub renderer: Arc<Renderer>,
}

impl PortalState {
    pub fn new(backend: BackendClient, renderer: Arc<Renderer>) -> Self {
        Self { backend, renderer }
    }
}

/// 创建门户路由（公开，无需认证）
///
/// # 端点
/// - `GET /portal/{userId}` - 公开信息 + PIN 表单
/// - `POST /portal/{userId}/unlock` - 提交 PIN
/// - `GET /portal/{userId}/call` - 拨打紧急联系人
pub fn create_portal_router(state: PortalState) -> Router {
    Router::new()
        .route("/portal/{user_id}", get(show_portal))
        .route("/portal/{user_id}/unlock", post(unlock))
        .route("/portal/{user_id}/call", get(call_emergency))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RetryPolicy;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(server: &MockServer) -> Router {
        let http = crate::http_client::build_client(None, Duration::from_secs(2)).unwrap();
        let backend = BackendClient::new(http, format!("{}/api", server.uri()), RetryPolicy::none());
        create_portal_router(PortalState::new(backend, Renderer::shared().unwrap()))
    }

    async fn mount_maria(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/public-info/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"nome": "Maria", "contatoEmergencia": "+551199999999"}),
            ))
            .mount(server)
            .await;
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn unlock_request(pin: &str) -> Request<Body> {
        Request::post("/portal/abc123/unlock")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("pin={}", pin)))
            .unwrap()
    }

    #[tokio::test]
    async fn test_existing_profile_renders_locked_page() {
        let server = MockServer::start().await;
        mount_maria(&server).await;

        let response = app(&server)
            .oneshot(Request::get("/portal/abc123").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let html = body_text(response).await;
        assert!(html.contains("<h2>Maria</h2>"));
        assert!(html.contains(r#"name="pin""#));
        assert!(!html.contains("Blood type"));
        assert!(!html.contains("Medical information"));
    }

    #[tokio::test]
    async fn test_missing_profile_renders_error_without_pin_form() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/public-info/nobody"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Usuário não encontrado"})),
            )
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(Request::get("/portal/nobody").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let html = body_text(response).await;
        assert!(html.contains("User not found or API offline."));
        assert!(!html.contains(r#"name="pin""#));
    }

    #[tokio::test]
    async fn test_correct_pin_reveals_medical_data() {
        let server = MockServer::start().await;
        mount_maria(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/unlock"))
            .and(body_json(json!({"userId": "abc123", "pin": "1234"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"tipoSanguineo": "O+", "alergias": "None"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server).oneshot(unlock_request("1234")).await.unwrap();

        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let html = body_text(response).await;
        assert!(html.contains("<h2>Maria</h2>"));
        assert!(html.contains("O+"));
        assert!(html.contains("None"));
        assert!(!html.contains(r#"name="pin""#));
    }

    #[tokio::test]
    async fn test_wrong_pin_stays_locked_with_message() {
        let server = MockServer::start().await;
        mount_maria(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/unlock"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"success": false, "error": "PIN inválido"})),
            )
            .mount(&server)
            .await;

        let response = app(&server).oneshot(unlock_request("0000")).await.unwrap();

        let html = body_text(response).await;
        assert!(html.contains("Invalid PIN. Try again."));
        assert!(html.contains(r#"name="pin""#));
        assert!(!html.contains("Medical information"));
    }

    #[tokio::test]
    async fn test_unlock_for_missing_profile_never_calls_backend_unlock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/public-info/abc123"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/unlock"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = app(&server).oneshot(unlock_request("1234")).await.unwrap();
        let html = body_text(response).await;
        assert!(html.contains("User not found or API offline."));
    }

    #[tokio::test]
    async fn test_call_redirects_to_stored_contact() {
        let server = MockServer::start().await;
        mount_maria(&server).await;

        let response = app(&server)
            .oneshot(Request::get("/portal/abc123/call").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "tel:+551199999999");
    }

    #[tokio::test]
    async fn test_call_without_contact_returns_to_portal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/public-info/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nome": "Maria"})))
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(Request::get("/portal/abc123/call").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/portal/abc123");
    }

    #[tokio::test]
    async fn test_call_button_links_tel_only_with_contact() {
        let server = MockServer::start().await;
        mount_maria(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/public-info/xyz789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nome": "João"})))
            .mount(&server)
            .await;
        let app = app(&server);

        let with_contact = app
            .clone()
            .oneshot(Request::get("/portal/abc123").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(with_contact).await;
        assert!(html.contains(r#"href="tel:+551199999999""#));

        let without_contact = app
            .oneshot(Request::get("/portal/xyz789").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(without_contact).await;
        assert!(!html.contains("tel:"));
        assert!(html.contains("No emergency contact"));
    }

    #[tokio::test]
    async fn test_unreadable_unlock_form_renders_locked_page() {
        let server = MockServer::start().await;
        mount_maria(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/unlock"))
            .and(body_json(json!({"userId": "abc123", "pin": ""})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"success": false, "error": "PIN obrigatório"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(
                Request::post("/portal/abc123/unlock")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"pin":"1234"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Invalid PIN. Try again."));
        assert!(html.contains(r#"name="pin""#));
    }
}
