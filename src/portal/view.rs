//! 门户页面视图数据

use serde::Serialize;

use super::dialer::emergency_call;
use super::state::{AccessFlow, AccessState};

/// PIN 输入框最大长度（仅限制表单输入，不做校验）
pub const PIN_MAX_LENGTH: usize = 6;

const NOT_INFORMED: &str = "Not informed";

#[derive(Debug, Serialize)]
pub struct MedicalField {
    pub label: String,
    pub value: String,
}

/// `portal.html` 的渲染数据
#[derive(Debug, Serialize)]
pub struct PortalView {
    pub status: &'static str,
    pub name: Option<String>,
    pub message: Option<String>,
    /// 仅在有紧急联系人时为 `tel:` 链接
    pub tel_href: Option<String>,
    pub unlock_action: String,
    pub pin_max_length: usize,
    /// 仅在 Unlocked 状态下非空
    pub medical: Vec<MedicalField>,
}

/// 门户页面路径
pub fn portal_path(user_id: &str) -> String {
    format!("/portal/{}", urlencoding::encode(user_id))
}

impl PortalView {
    pub fn from_flow(flow: &AccessFlow) -> Self {
        let mut view = Self {
            status: "loading",
            name: flow.state().profile().map(|p| p.name.clone()),
            message: None,
            tel_href: emergency_call(flow.state().profile()).map(|t| t.to_uri()),
            unlock_action: format!("{}/unlock", portal_path(flow.user_id())),
            pin_max_length: PIN_MAX_LENGTH,
            medical: Vec::new(),
        };

        match flow.state() {
            AccessState::Loading => {}
            AccessState::Error { message } => {
                view.status = "error";
                view.message = Some(message.clone());
            }
            AccessState::Locked { error, .. } => {
                view.status = "locked";
                view.message = error.clone();
            }
            AccessState::Verifying { .. } => {
                view.status = "verifying";
            }
            AccessState::Unlocked { data, .. } => {
                view.status = "unlocked";
                let field = |label: &str, value: Option<&String>| MedicalField {
                    label: label.to_string(),
                    value: value
                        .filter(|v| !v.trim().is_empty())
                        .cloned()
                        .unwrap_or_else(|| NOT_INFORMED.to_string()),
                };
                view.medical.push(field("Blood type", data.blood_type.as_ref()));
                view.medical.push(field("Allergies", data.allergies.as_ref()));
                view.medical.extend(
                    data.extra_fields()
                        .into_iter()
                        .map(|(label, value)| MedicalField { label, value }),
                );
            }
        }
        view
    }
}
