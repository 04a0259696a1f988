//! 门户访问流程状态机
//!
//! `Loading -> {Error | Locked} -> Verifying -> {Unlocked | Locked(error)}`
//!
//! 私密数据只能经由 `Verifying` 状态下后端成功响应进入 `Unlocked`；
//! 每次请求都携带代际号，过期代际的响应直接丢弃。
//! 每个 HTTP 请求创建独立的 `AccessFlow`，标识在流程内不会改变。

use crate::api::types::{PrivateMedicalData, PublicProfile};
use crate::api::{ApiError, BackendClient};

/// 公开信息加载失败时的提示
pub const LOAD_ERROR_MESSAGE: &str = "User not found or API offline.";
/// PIN 解锁失败时的提示（不区分 PIN 错误与用户不存在）
pub const INVALID_PIN_MESSAGE: &str = "Invalid PIN. Try again.";

/// 页面访问状态
#[derive(Debug, Clone, PartialEq)]
pub enum AccessState {
    Loading,
    Error {
        message: String,
    },
    Locked {
        profile: PublicProfile,
        /// 上一次解锁失败的提示
        error: Option<String>,
    },
    Verifying {
        profile: PublicProfile,
    },
    Unlocked {
        profile: PublicProfile,
        data: PrivateMedicalData,
    },
}

impl AccessState {
    pub fn profile(&self) -> Option<&PublicProfile> {
        match self {
            Self::Locked { profile, .. }
            | Self::Verifying { profile }
            | Self::Unlocked { profile, .. } => Some(profile),
            Self::Loading | Self::Error { .. } => None,
        }
    }
}

/// 请求代际号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// 单个页面生命周期内的访问流程
#[derive(Debug)]
pub struct AccessFlow {
    user_id: String,
    generation: u64,
    state: AccessState,
}

impl AccessFlow {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            generation: 0,
            state: AccessState::Loading,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> &AccessState {
        &self.state
    }

    fn next_generation(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.generation
    }

    /// 开始加载公开信息
    ///
    /// 返回本次加载的代际号，之前发出的请求随之作废
    pub fn begin_load(&mut self) -> Generation {
        self.state = AccessState::Loading;
        self.next_generation()
    }

    /// 应用公开信息加载结果
    ///
    /// 返回结果是否被采纳
    pub fn finish_load(
        &mut self,
        generation: Generation,
        result: Result<PublicProfile, ApiError>,
    ) -> bool {
        if !self.is_current(generation) || self.state != AccessState::Loading {
            tracing::debug!(user_id = %self.user_id, "丢弃过期的公开信息响应");
            return false;
        }

        self.state = match result {
            Ok(profile) => AccessState::Locked {
                profile,
                error: None,
            },
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, "获取公开信息失败: {}", e);
                AccessState::Error {
                    message: LOAD_ERROR_MESSAGE.to_string(),
                }
            }
        };
        true
    }

    /// 提交 PIN：仅 Locked 状态可进入 Verifying
    pub fn begin_unlock(&mut self) -> Option<Generation> {
        let profile = match &self.state {
            AccessState::Locked { profile, .. } => profile.clone(),
            _ => return None,
        };
        self.state = AccessState::Verifying { profile };
        Some(self.next_generation())
    }

    /// 应用解锁结果
    ///
    /// 任何失败都回到 Locked 并附带统一的 PIN 错误提示
    pub fn finish_unlock(
        &mut self,
        generation: Generation,
        result: Result<PrivateMedicalData, ApiError>,
    ) -> bool {
        if !self.is_current(generation) {
            tracing::debug!(user_id = %self.user_id, "丢弃过期的解锁响应");
            return false;
        }
        let profile = match &self.state {
            AccessState::Verifying { profile } => profile.clone(),
            _ => return false,
        };

        self.state = match result {
            Ok(data) => AccessState::Unlocked { profile, data },
            Err(e) => {
                tracing::info!(user_id = %self.user_id, "PIN 解锁被拒绝: {}", e);
                AccessState::Locked {
                    profile,
                    error: Some(INVALID_PIN_MESSAGE.to_string()),
                }
            }
        };
        true
    }

    /// 加载公开信息（一次请求）
    pub async fn load(&mut self, backend: &BackendClient) {
        let generation = self.begin_load();
        let result = backend.public_info(&self.user_id).await;
        self.finish_load(generation, result);
    }

    /// 使用 PIN 解锁；非 Locked 状态下不发起请求
    pub async fn unlock(&mut self, backend: &BackendClient, pin: &str) {
        let Some(generation) = self.begin_unlock() else {
            return;
        };
        let result = backend.unlock(&self.user_id, pin).await;
        self.finish_unlock(generation, result);
    }
}
