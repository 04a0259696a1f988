//! 管理后台类型定义

use serde::Serialize;

use crate::api::types::AdminUserRecord;
use crate::portal::view::portal_path;

/// 用户列表为空时的提示
pub const EMPTY_MESSAGE: &str = "No users found.";
/// 无会话时的提示
pub const AUTH_REQUIRED_MESSAGE: &str = "No user is signed in.";
/// 列表加载失败提示前缀
pub const LOAD_FAILED_PREFIX: &str = "Failed to load users.";

const UNNAMED: &str = "Unnamed";

// ============ 列表加载结果 ============

/// 用户列表加载结果
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardOutcome {
    /// 没有会话，未发起请求
    AuthRequired,
    /// 请求失败（区分后端报告的错误文本与传输层错误）
    Failed { message: String },
    /// 列表为空（不是错误）
    Empty,
    Users(Vec<AdminUserRecord>),
}

// ============ 视图 ============

/// 表格行
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub portal_href: String,
}

impl From<&AdminUserRecord> for UserRow {
    fn from(record: &AdminUserRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.display_name().unwrap_or(UNNAMED).to_string(),
            portal_href: portal_path(&record.id),
        }
    }
}

/// `dashboard.html` 的渲染数据
#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub outcome: &'static str,
    pub email: Option<String>,
    pub message: Option<String>,
    pub users: Vec<UserRow>,
}

impl DashboardView {
    pub fn new(outcome: &DashboardOutcome, email: Option<&str>) -> Self {
        let email = email.map(str::to_string);
        match outcome {
            DashboardOutcome::AuthRequired => Self {
                outcome: "auth_required",
                email,
                message: Some(AUTH_REQUIRED_MESSAGE.to_string()),
                users: Vec::new(),
            },
            DashboardOutcome::Failed { message } => Self {
                outcome: "failed",
                email,
                message: Some(message.clone()),
                users: Vec::new(),
            },
            DashboardOutcome::Empty => Self {
                outcome: "empty",
                email,
                message: Some(EMPTY_MESSAGE.to_string()),
                users: Vec::new(),
            },
            DashboardOutcome::Users(records) => Self {
                outcome: "users",
                email,
                message: None,
                users: records.iter().map(UserRow::from).collect(),
            },
        }
    }
}
