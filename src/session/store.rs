//! 内存会话存储
//!
//! 会话只保存在进程内存中，重启即失效

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::provider::{AuthError, AuthProvider, IssuedToken};

/// ID Token 剩余有效期低于该值时提前刷新
const REFRESH_MARGIN_SECS: i64 = 60;

/// 单个管理员会话
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    id_token: String,
    refresh_token: String,
    token_expires_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn token_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at - chrono::Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// `now + duration`，溢出时取最大时间
fn expiry_after(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 会话存储
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 登录成功后创建会话，返回会话 ID
    pub fn create(&self, token: IssuedToken) -> String {
        let now = Utc::now();
        let session_id = Uuid::new_v4().simple().to_string();
        let session = Session {
            user_id: token.user_id,
            email: token.email,
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            token_expires_at: expiry_after(now, token.expires_in),
            expires_at: expiry_after(now, self.ttl),
        };
        self.sessions.write().insert(session_id.clone(), session);
        session_id
    }

    /// 查找有效会话；已过期的会话会被移除
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(session_id) {
                Some(session) if session.expires_at > now => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().remove(session_id);
        tracing::debug!("会话已过期，已移除");
        None
    }

    /// 刷新后更新 Token（会话不存在时忽略）
    fn update_token(&self, session_id: &str, token: &IssuedToken) {
        if let Some(session) = self.sessions.write().get_mut(session_id) {
            session.id_token = token.id_token.clone();
            session.refresh_token = token.refresh_token.clone();
            session.token_expires_at = expiry_after(Utc::now(), token.expires_in);
        }
    }

    /// 移除会话，返回会话是否存在
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    /// 清理全部过期会话，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

/// 已认证会话能力
///
/// 由会话守卫注入到请求扩展中，需要后端认证的组件显式接收它
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    session: Session,
    store: Arc<SessionStore>,
    provider: Arc<dyn AuthProvider>,
}

impl SessionHandle {
    pub fn new(
        session_id: impl Into<String>,
        session: Session,
        store: Arc<SessionStore>,
        provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            session,
            store,
            provider,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.session.email.as_deref()
    }

    /// 获取短期 ID Token，临近过期时通过认证服务刷新
    ///
    /// refresh token 失效时同时移除会话
    pub async fn id_token(&self) -> Result<String, AuthError> {
        let current = self
            .store
            .get(&self.session_id)
            .ok_or(AuthError::SessionExpired)?;
        if current.token_fresh_at(Utc::now()) {
            return Ok(current.id_token);
        }

        tracing::debug!(user_id = %current.user_id, "ID Token 即将过期，正在刷新");
        match self.provider.refresh(&current.refresh_token).await {
            Ok(token) => {
                self.store.update_token(&self.session_id, &token);
                Ok(token.id_token)
            }
            Err(AuthError::SessionExpired) => {
                self.store.remove(&self.session_id);
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }
}
