//! 后端 REST API 客户端
//!
//! Input: 后端基础地址、reqwest::Client、重试策略
//! Output: 公开信息、解锁结果、管理员用户列表
//! Pos: 所有后端网络调用的唯一出口

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::retry::RetryPolicy;
use super::types::{AdminUserRecord, PrivateMedicalData, PublicProfile, UnlockRequest, UnlockResponse};
use crate::common::{LOG_BODY_MAX_BYTES, truncate_for_log};

/// 后端 API 客户端
///
/// 超时由底层 `reqwest::Client` 负责；GET 请求按 `RetryPolicy` 重试，解锁请求不重试
#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(http: Client, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /public-info/{userId}
    pub async fn public_info(&self, user_id: &str) -> Result<PublicProfile, ApiError> {
        let url = format!(
            "{}/public-info/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );
        let url = url.as_str();
        self.retry
            .run("public-info", || async move {
                self.get_json::<PublicProfile>(url, None).await
            })
            .await
    }

    /// POST /unlock
    ///
    /// 仅当后端返回 `success: true` 且携带数据时才返回私密数据
    pub async fn unlock(&self, user_id: &str, pin: &str) -> Result<PrivateMedicalData, ApiError> {
        let url = format!("{}/unlock", self.base_url);
        let request = self.http.post(&url).json(&UnlockRequest { user_id, pin });

        let response = self.send(request).await?;
        let body: UnlockResponse = response.json().await.map_err(ApiError::from_reqwest)?;

        match (body.success, body.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ApiError::Decode("unlock succeeded without data".to_string())),
            (false, _) => Err(ApiError::InvalidCredential {
                status: 200,
                reported: body.error,
            }),
        }
    }

    /// GET /admin/users（Bearer 认证）
    pub async fn list_users(&self, id_token: &str) -> Result<Vec<AdminUserRecord>, ApiError> {
        let url = format!("{}/admin/users", self.base_url);
        let url = url.as_str();
        self.retry
            .run("admin-users", || async move {
                self.get_json::<Vec<AdminUserRecord>>(url, Some(id_token)).await
            })
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let mut request = self.http.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(ApiError::from_reqwest)
    }

    /// 发送请求，非 2xx 响应转换为 [`ApiError`]
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            "后端返回错误: HTTP {} {} {}",
            status,
            url,
            truncate_for_log(&body, LOG_BODY_MAX_BYTES)
        );
        Err(ApiError::from_status(status, &body))
    }
}
