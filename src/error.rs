//! 统一错误处理模块
//!
//! 提供流式翻译服务的统一错误类型定义和处理机制

// 标准库导入
use std::fmt;

/// 流式翻译服务统一错误类型
///
/// 网络与HTML错误在流级别终止请求，翻译API错误只影响单个批次
#[derive(Debug)]
pub enum TranslationError {
    /// 网络请求相关错误
    Network {
        /// 错误消息
        message: String,
        /// HTTP状态码（如果适用）
        status_code: Option<u16>,
    },

    /// HTML解析或内容类型错误
    HtmlParse {
        /// 具体错误信息
        details: String,
    },

    /// 翻译API相关错误
    TranslationApi {
        /// API响应状态码
        status_code: u16,
        /// 错误消息
        message: String,
        /// API地址
        api_url: String,
    },

    /// 配置相关错误
    Configuration {
        /// 配置项名称
        field: String,
        /// 错误原因
        reason: String,
    },

    /// 输入验证错误
    InputValidation {
        /// 输入值
        input: String,
        /// 验证失败原因
        reason: String,
    },
}

impl TranslationError {
    /// 是否属于请求参数错误（应返回4xx而非建立流）
    pub fn is_validation(&self) -> bool {
        matches!(self, TranslationError::InputValidation { .. })
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationError::Network { message, status_code } => {
                if let Some(code) = status_code {
                    write!(f, "网络请求失败 [{}]: {}", code, message)
                } else {
                    write!(f, "网络请求失败: {}", message)
                }
            }
            TranslationError::HtmlParse { details } => {
                write!(f, "HTML解析失败: {}", details)
            }
            TranslationError::TranslationApi { status_code, message, api_url } => {
                write!(f, "翻译API错误 [{}] {}: {}", status_code, api_url, message)
            }
            TranslationError::Configuration { field, reason } => {
                write!(f, "配置错误 [{}]: {}", field, reason)
            }
            TranslationError::InputValidation { input, reason } => {
                write!(f, "输入验证失败 [{}]: {}", input, reason)
            }
        }
    }
}

impl std::error::Error for TranslationError {}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, TranslationError>;

/// 便捷的错误创建宏
#[macro_export]
macro_rules! translation_error {
    (network, $msg:expr) => {
        $crate::error::TranslationError::Network {
            message: $msg.to_string(),
            status_code: None,
        }
    };
    (network, $msg:expr, $code:expr) => {
        $crate::error::TranslationError::Network {
            message: $msg.to_string(),
            status_code: Some($code),
        }
    };
    (html_parse, $details:expr) => {
        $crate::error::TranslationError::HtmlParse {
            details: $details.to_string(),
        }
    };
    (translation_api, $code:expr, $msg:expr, $url:expr) => {
        $crate::error::TranslationError::TranslationApi {
            status_code: $code,
            message: $msg.to_string(),
            api_url: $url.to_string(),
        }
    };
    (config, $field:expr, $reason:expr) => {
        $crate::error::TranslationError::Configuration {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    (input_validation, $input:expr, $reason:expr) => {
        $crate::error::TranslationError::InputValidation {
            input: $input.to_string(),
            reason: $reason.to_string(),
        }
    };
}

/// 从reqwest::Error转换为TranslationError
impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        TranslationError::Network {
            message: error.to_string(),
            status_code,
        }
    }
}
