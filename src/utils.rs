//! 通用工具函数
//!
//! 日志初始化、页面URL校验和文本规范化

// 标准库导入
use std::sync::OnceLock;

// 第三方crate导入
use regex::Regex;
use url::Url;

// 本地模块导入
use crate::error::Result;
use crate::translation_error;

/// 初始化日志系统
pub fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// 验证页面URL
/// 只接受 http/https 地址
pub fn validate_page_url(input: &str) -> Result<Url> {
    if input.trim().is_empty() {
        return Err(translation_error!(input_validation, input, "URL不能为空"));
    }

    let url = Url::parse(input)
        .map_err(|e| translation_error!(input_validation, input, format!("解析URL失败: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(translation_error!(
            input_validation,
            input,
            "URL必须以http://或https://开头"
        ));
    }

    Ok(url)
}

/// 将连续空白压缩为单个空格（不去除首尾）
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    WHITESPACE
        .get_or_init(|| Regex::new(r"\s+").expect("空白正则表达式无效"))
        .replace_all(text, " ")
        .into_owned()
}

/// 截断过长文本用于日志输出
pub fn preview_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}…", truncated)
}
