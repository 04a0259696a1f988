//! 管理员会话模块
//!
//! Input: Firebase Authentication、Cookie
//! Output: 登录/登出路由、会话能力 `SessionHandle`
//! Pos: 管理后台的认证层

mod handlers;
pub mod provider;
mod router;
pub mod store;

pub use handlers::LOGIN_PATH;
pub use provider::{AuthProvider, FirebaseAuth};
pub use router::{SessionState, create_session_router};
pub use store::{SessionHandle, SessionStore};
