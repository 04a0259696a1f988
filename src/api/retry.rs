//! 重试策略
//!
//! 指数退避 + 随机抖动，只重试 [`ApiError::is_retryable`] 判定的错误

use std::future::Future;
use std::time::Duration;

use super::error::ApiError;

/// 退避上限
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// 有界重试策略
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 最大重试次数（不含首次请求）
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// 不重试
    #[cfg(test)]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// 第 `attempt` 次重试前的退避时长（不含抖动），attempt 从 1 开始
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }

    /// 退避时长加上最多 25% 的随机抖动
    fn delay_for(&self, attempt: u32) -> Duration {
        let backoff = self.backoff(attempt);
        let jitter_ms = (backoff.as_millis() / 4) as u64;
        if jitter_ms == 0 {
            return backoff;
        }
        backoff + Duration::from_millis(fastrand::u64(0..=jitter_ms))
    }

    /// 执行操作，失败且可重试时按策略重试
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "后端请求失败，准备重试: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
