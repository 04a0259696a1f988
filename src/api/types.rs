//! 后端 API 类型定义
//!
//! 字段名与后端 JSON 保持一致（葡萄牙语 camelCase 键）

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ 公开信息 ============

/// 患者公开信息（无需认证即可获取）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    /// 患者姓名
    #[serde(rename = "nome", default)]
    pub name: String,
    /// 紧急联系人电话
    #[serde(
        rename = "contatoEmergencia",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub emergency_contact: Option<String>,
}

// ============ 私密医疗数据 ============

/// 私密医疗数据（仅在 PIN 校验成功后由后端返回）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateMedicalData {
    /// 血型
    #[serde(
        rename = "tipoSanguineo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub blood_type: Option<String>,
    /// 过敏信息
    #[serde(rename = "alergias", default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    /// 其余扩展字段，原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PrivateMedicalData {
    /// 扩展字段的 (键, 展示值) 列表，按键排序
    pub fn extra_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), display_value(v)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

// ============ 解锁 ============

/// POST /unlock 请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRequest<'a> {
    pub user_id: &'a str,
    pub pin: &'a str,
}

/// POST /unlock 响应体
#[derive(Debug, Deserialize)]
pub struct UnlockResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<PrivateMedicalData>,
    #[serde(default)]
    pub error: Option<String>,
}

// ============ 管理员用户列表 ============

/// GET /admin/users 列表项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserRecord {
    /// 用户 ID（写入 NFC 标签的标识）
    pub id: String,
    #[serde(rename = "infoPublica", default)]
    pub public_info: Option<AdminPublicInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPublicInfo {
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminUserRecord {
    /// 展示用姓名，缺失时返回 None
    pub fn display_name(&self) -> Option<&str> {
        self.public_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

// ============ 错误响应 ============

/// 后端错误响应体 `{ "error": "..." }`
#[derive(Debug, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
