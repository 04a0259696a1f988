//! 后端调用错误分类

use reqwest::StatusCode;

use super::types::BackendErrorBody;

/// 后端 API 调用错误
///
/// 所有页面级错误都由此转换为用户可见的提示文本
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 资源不存在（404）
    #[error("not found")]
    NotFound { reported: Option<String> },

    /// 请求超时
    #[error("request timed out")]
    Timeout,

    /// 网络层错误（连接失败、连接中断等）
    #[error("network error: {0}")]
    Network(String),

    /// 凭据无效（PIN 错误、Token 缺失或过期，401/403）
    #[error("invalid credential (HTTP {status})")]
    InvalidCredential {
        status: u16,
        reported: Option<String>,
    },

    /// 其它后端错误
    #[error("server error (HTTP {status})")]
    Server {
        status: u16,
        reported: Option<String>,
    },

    /// 响应体无法解析
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// 将 reqwest 错误归类
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// 根据非 2xx 状态码和响应正文归类
    ///
    /// 正文为 `{ "error": "..." }` 时提取后端报告的错误文本
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let reported = serde_json::from_str::<BackendErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|e| !e.trim().is_empty());

        match status {
            StatusCode::NOT_FOUND => Self::NotFound { reported },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::InvalidCredential {
                status: status.as_u16(),
                reported,
            },
            _ => Self::Server {
                status: status.as_u16(),
                reported,
            },
        }
    }

    /// 后端在响应体中报告的错误文本
    pub fn reported(&self) -> Option<&str> {
        match self {
            Self::NotFound { reported }
            | Self::InvalidCredential { reported, .. }
            | Self::Server { reported, .. } => reported.as_deref(),
            _ => None,
        }
    }

    /// 是否为传输层错误（未拿到后端响应）
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }

    /// 是否值得重试：传输层错误和 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// 优先使用后端报告的错误文本，否则使用错误描述
    pub fn detail(&self) -> String {
        match self.reported() {
            Some(reported) => reported.to_string(),
            None => self.to_string(),
        }
    }
}
