//! 患者公开门户
//!
//! NFC 标签指向 `/portal/{userId}`：展示姓名和紧急联系人，
//! PIN 校验通过后展示私密医疗数据

pub mod dialer;
mod handlers;
mod router;
pub mod state;
pub mod view;

pub use router::{PortalState, create_portal_router};
