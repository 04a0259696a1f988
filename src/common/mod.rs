//! 公共工具模块

/// 日志中后端错误正文的最大字节数
pub const LOG_BODY_MAX_BYTES: usize = 256;

/// 截断用于日志输出的字符串，不会在多字节字符中间截断
///
/// 超出 `max_bytes` 时追加 `...`
pub fn truncate_for_log(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut end = max_bytes.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// 去除首尾空白，空字符串视为缺失
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
