//! Admin 模块
//!
//! Input: 会话能力、后端 API
//! Output: 管理后台路由
//! Pos: 管理员用户列表
//!
//! # 功能
//! - 会话守卫（未登录重定向到登录页）
//! - 用户列表（编辑/删除按钮尚未实现，以禁用状态展示）

mod handlers;
mod middleware;
mod router;
mod service;
pub mod types;

pub use middleware::AdminState;
pub use router::create_admin_router;
pub use service::AdminService;
