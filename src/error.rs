//! 错误处理模块
//!
//! 定义翻译流水线中使用的错误类型和错误处理机制。
//!
//! 流水线内部绝大多数失败都会被降级处理（保留原文），只有输入文件不可读、
//! 输出文件不可写这类问题才会以 `TranslationError` 的形式返回给调用方。

use thiserror::Error;

/// 翻译错误类型
///
/// 包含翻译过程中可能出现的各种错误情况。
///
/// # 变体说明
///
/// * `Http` - HTTP请求错误
/// * `Io` - 文件读写错误
/// * `Json` - JSON 序列化/反序列化错误
/// * `Toml` - 配置文件解析错误
/// * `Config` - 配置内容不合法
/// * `ApiError` - API响应错误，包含错误代码和消息
/// * `ParseError` - 响应解析错误
/// * `SpanRestore` - 占位符还原失败
/// * `Custom` - 自定义错误消息
#[derive(Debug, Error)]
pub enum TranslationError {
    /// HTTP请求错误
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 文件读写错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 错误
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 配置文件解析错误
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// 配置内容不合法
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// API响应错误
    #[error("API error {code}: {message}")]
    ApiError {
        /// 错误代码
        code: i32,
        /// 错误消息
        message: String,
    },

    /// 解析错误
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 受保护片段的占位符在译文中丢失或重复
    #[error("Placeholder for protected span #{index} is missing or duplicated")]
    SpanRestore {
        /// 片段序号
        index: usize,
    },

    /// 自定义错误消息
    #[error("{0}")]
    Custom(String),
}

impl From<String> for TranslationError {
    fn from(error: String) -> Self {
        TranslationError::Custom(error)
    }
}

impl From<&str> for TranslationError {
    fn from(error: &str) -> Self {
        TranslationError::Custom(error.to_string())
    }
}

/// 翻译结果类型别名
///
/// 简化返回类型，使用 `TranslationError` 作为错误类型。
///
/// # 示例
///
/// ```rust
/// use skill_translator::{Result, TranslationError};
///
/// fn example_function() -> Result<String> {
///     Ok("Success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, TranslationError>;
