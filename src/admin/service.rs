//! 管理后台业务逻辑

use crate::api::BackendClient;
use crate::session::SessionHandle;

use super::types::{DashboardOutcome, LOAD_FAILED_PREFIX};

/// 管理后台服务
pub struct AdminService {
    backend: BackendClient,
}

impl AdminService {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// 加载用户列表（每次渲染一次请求）
    ///
    /// 没有会话时不发起请求
    pub async fn load_users(&self, session: Option<&SessionHandle>) -> DashboardOutcome {
        let Some(session) = session else {
            tracing::warn!("未登录，跳过用户列表请求");
            return DashboardOutcome::AuthRequired;
        };

        let id_token = match session.id_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("获取 ID Token 失败: {}", e);
                return DashboardOutcome::Failed {
                    message: format!("{} {}", LOAD_FAILED_PREFIX, e),
                };
            }
        };

        match self.backend.list_users(&id_token).await {
            Ok(users) if users.is_empty() => DashboardOutcome::Empty,
            Ok(users) => DashboardOutcome::Users(users),
            Err(e) => {
                tracing::warn!(transport = e.is_transport(), "获取用户列表失败: {}", e);
                DashboardOutcome::Failed {
                    message: format!("{} {}", LOAD_FAILED_PREFIX, e.detail()),
                }
            }
        }
    }
}
