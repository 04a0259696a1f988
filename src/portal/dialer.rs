//! 紧急联系人拨号
//!
//! 生成 `tel:` URI，由浏览器/手机系统接管拨号

use axum::http::HeaderValue;

use crate::api::types::PublicProfile;

/// 拨号目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelUri {
    contact: String,
}

impl TelUri {
    pub fn to_uri(&self) -> String {
        format!("tel:{}", self.contact)
    }

    /// 作为 Location 头的值；含非法字符时返回 None
    pub fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.to_uri()).ok()
    }
}

/// 根据公开信息决定拨号目标
///
/// 没有公开信息或联系人为空时返回 None，号码原样传递
pub fn emergency_call(profile: Option<&PublicProfile>) -> Option<TelUri> {
    let contact = profile?.emergency_contact.as_deref()?;
    if contact.trim().is_empty() {
        return None;
    }
    Some(TelUri {
        contact: contact.to_string(),
    })
}
