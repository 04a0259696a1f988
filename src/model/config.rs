use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 环境变量：覆盖后端 API 地址
pub const ENV_API_BASE_URL: &str = "PORTAL_API_BASE_URL";
/// 环境变量：覆盖 Firebase Web API Key
pub const ENV_FIREBASE_API_KEY: &str = "FIREBASE_API_KEY";

/// 门户应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// 后端 REST API 基础地址（包含 `/api` 前缀）
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// 单次请求超时（秒），后端和认证服务共用
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 幂等请求的最大重试次数（不含首次请求）
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 重试退避基准延迟（毫秒）
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// HTTP 代理地址（可选）
    /// 支持格式: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// Firebase Web API Key（未配置时管理员登录不可用）
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_api_key: Option<String>,

    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: String,

    #[serde(default = "default_secure_token_base_url")]
    pub secure_token_base_url: String,

    /// 管理员会话有效期（秒）
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// 会话 Cookie 是否带 Secure 标记（HTTPS 部署时开启）
    #[serde(default)]
    pub secure_cookies: bool,

    /// 配置文件路径（运行时元数据，不写入 JSON）
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    200
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com".to_string()
}

fn default_secure_token_base_url() -> String {
    "https://securetoken.googleapis.com".to_string()
}

fn default_session_ttl_secs() -> u64 {
    8 * 60 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            proxy_url: None,
            firebase_api_key: None,
            identity_base_url: default_identity_base_url(),
            secure_token_base_url: default_secure_token_base_url(),
            session_ttl_secs: default_session_ttl_secs(),
            secure_cookies: false,
            config_path: None,
        }
    }
}

impl Config {
    /// 获取默认配置文件路径
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // 配置文件不存在，返回默认配置
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// 使用环境变量覆盖文件中的值
    ///
    /// 空字符串视为未设置
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(key) = non_empty(ENV_FIREBASE_API_KEY) {
            self.firebase_api_key = Some(key);
        }
    }

    /// 获取配置文件路径（如果有）
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 后端基础地址（去掉末尾的 `/`）
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retries, 2);
        assert!(config.firebase_api_key.is_none());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join(format!("nfc-portal-missing-{}.json", uuid::Uuid::new_v4()));
        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_load_partial_camel_case_file() {
        let path = std::env::temp_dir().join(format!("nfc-portal-{}.json", uuid::Uuid::new_v4()));
        fs::write(
            &path,
            r#"{"port": 9000, "apiBaseUrl": "https://api.example.com/api/", "maxRetries": 0}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base(), "https://api.example.com/api");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides_ignore_blank_values() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_API_BASE_URL => Some("http://backend:5000/api".to_string()),
            ENV_FIREBASE_API_KEY => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.api_base_url, "http://backend:5000/api");
        assert!(config.firebase_api_key.is_none());
    }
}
