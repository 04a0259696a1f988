//! 后端 REST API 模块
//!
//! 封装 `/public-info`、`/unlock`、`/admin/users` 三个端点，
//! 统一超时、重试与错误分类

mod client;
mod error;
mod retry;
pub mod types;

pub use client::BackendClient;
pub use error::ApiError;
pub use retry::RetryPolicy;
