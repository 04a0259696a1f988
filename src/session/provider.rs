//! 认证服务提供方
//!
//! Input: 邮箱/密码、refresh token
//! Output: 短期 ID Token
//! Pos: Firebase Authentication REST 接口封装

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::common::non_blank;

/// 认证服务签发的 Token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: Duration,
    pub user_id: String,
    pub email: Option<String>,
}

/// 认证错误
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("sign-in is not configured")]
    NotConfigured,
    #[error("session expired")]
    SessionExpired,
    #[error("authentication provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
}

/// 认证服务 trait
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// 邮箱密码登录
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError>;

    /// 使用 refresh token 换取新的 ID Token
    async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError>;
}

/// Firebase Authentication（Identity Toolkit + Secure Token REST API）
pub struct FirebaseAuth {
    http: Client,
    api_key: Option<String>,
    identity_base_url: String,
    secure_token_base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Secure Token 接口使用 snake_case
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorBody {
    error: FirebaseErrorDetail,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorDetail {
    #[serde(default)]
    message: String,
}

/// 视为“凭据错误”的 Firebase 错误码
const CREDENTIAL_ERRORS: &[&str] = &[
    "EMAIL_NOT_FOUND",
    "INVALID_PASSWORD",
    "INVALID_LOGIN_CREDENTIALS",
    "INVALID_EMAIL",
    "MISSING_PASSWORD",
    "USER_DISABLED",
];

/// Firebase 默认的 ID Token 有效期
const DEFAULT_EXPIRES_IN: Duration = Duration::from_secs(3600);

impl FirebaseAuth {
    pub fn new(
        http: Client,
        api_key: Option<String>,
        identity_base_url: impl Into<String>,
        secure_token_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: non_blank(api_key.as_deref()).map(str::to_string),
            identity_base_url: identity_base_url.into().trim_end_matches('/').to_string(),
            secure_token_base_url: secure_token_base_url
                .into()
                .trim_end_matches('/')
                .to_string(),
        }
    }

    fn api_key(&self) -> Result<&str, AuthError> {
        self.api_key.as_deref().ok_or(AuthError::NotConfigured)
    }

    async fn error_from_response(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<FirebaseErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_default();
        // 错误码可能带有附加说明，如 "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
        let code = code.split(':').next().unwrap_or_default().trim().to_string();

        if CREDENTIAL_ERRORS.contains(&code.as_str()) {
            AuthError::InvalidCredentials
        } else if code.is_empty() {
            AuthError::Provider(format!("HTTP {}", status))
        } else {
            AuthError::Provider(code)
        }
    }
}

fn parse_expires_in(value: &str) -> Duration {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_EXPIRES_IN)
}

fn network_error(err: reqwest::Error) -> AuthError {
    AuthError::Network(err.to_string())
}

#[async_trait::async_trait]
impl AuthProvider for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword",
            self.identity_base_url
        );
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key()?)])
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body: SignInResponse = response.json().await.map_err(network_error)?;
        Ok(IssuedToken {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: parse_expires_in(&body.expires_in),
            user_id: body.local_id,
            email: body.email,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let url = format!("{}/v1/token", self.secure_token_base_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key()?)])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(match Self::error_from_response(response).await {
                AuthError::Provider(code)
                    if code == "TOKEN_EXPIRED" || code == "INVALID_REFRESH_TOKEN" =>
                {
                    AuthError::SessionExpired
                }
                other => other,
            });
        }

        let body: RefreshResponse = response.json().await.map_err(network_error)?;
        Ok(IssuedToken {
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_in: parse_expires_in(&body.expires_in),
            user_id: body.user_id,
            email: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn firebase(server: &MockServer, api_key: Option<&str>) -> FirebaseAuth {
        let http = crate::http_client::build_client(None, Duration::from_secs(2)).unwrap();
        FirebaseAuth::new(
            http,
            api_key.map(str::to_string),
            server.uri(),
            server.uri(),
        )
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "web-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "idToken": "id-1",
                "refreshToken": "refresh-1",
                "expiresIn": "3600",
                "localId": "uid-1",
                "email": "admin@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = firebase(&server, Some("web-key"))
            .sign_in("admin@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(token.id_token, "id-1");
        assert_eq!(token.refresh_token, "refresh-1");
        assert_eq!(token.expires_in, Duration::from_secs(3600));
        assert_eq!(token.user_id, "uid-1");
        assert_eq!(token.email.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}
            })))
            .mount(&server)
            .await;

        let err = firebase(&server, Some("web-key"))
            .sign_in("admin@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_in_rate_limited_keeps_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"}
            })))
            .mount(&server)
            .await;

        let err = firebase(&server, Some("web-key"))
            .sign_in("admin@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref code) if code == "TOO_MANY_ATTEMPTS_TRY_LATER"));
    }

    #[tokio::test]
    async fn test_sign_in_without_api_key_is_not_configured() {
        let server = MockServer::start().await;
        let err = firebase(&server, None)
            .sign_in("admin@example.com", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_uses_form_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id_token": "id-2",
                "refresh_token": "refresh-2",
                "expires_in": "1800",
                "token_type": "Bearer",
                "user_id": "uid-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = firebase(&server, Some("web-key"))
            .refresh("refresh-1")
            .await
            .unwrap();
        assert_eq!(token.id_token, "id-2");
        assert_eq!(token.refresh_token, "refresh-2");
        assert_eq!(token.expires_in, Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_refresh_with_revoked_token_is_session_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "TOKEN_EXPIRED"}
            })))
            .mount(&server)
            .await;

        let err = firebase(&server, Some("web-key"))
            .refresh("refresh-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionExpired));
    }

    #[test]
    fn test_parse_expires_in_falls_back_to_default() {
        assert_eq!(parse_expires_in("120"), Duration::from_secs(120));
        assert_eq!(parse_expires_in("abc"), DEFAULT_EXPIRES_IN);
    }
}
