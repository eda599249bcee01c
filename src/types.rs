//! 类型定义模块
//!
//! 定义翻译流水线中使用的配置类型和 DeepLX 接口的数据结构。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 翻译后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 离线字典替换
    Dictionary,
    /// 远程 DeepLX 接口
    #[default]
    Remote,
}

/// 翻译配置
///
/// 包含翻译服务的所有配置选项，如API地址、语言设置、请求节奏等。
///
/// # 字段说明
///
/// * `backend` - 使用的翻译后端
/// * `source_lang` - 源语言代码
/// * `target_lang` - 目标语言代码
/// * `endpoints` - DeepLX 接口地址列表，按顺序尝试
/// * `request_delay_ms` - 每次请求前的固定等待时间
/// * `request_jitter_ms` - 在固定等待之上追加的随机等待上限
/// * `timeout_secs` - 单次请求超时
/// * `max_text_length` - 单次翻译的最大文本长度，超出后按句子切分
/// * `field_suffix` - 译文字段后缀，如 `name_zh`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub backend: BackendKind,
    pub source_lang: String,
    pub target_lang: String,
    pub endpoints: Vec<String>,
    pub request_delay_ms: u64,
    pub request_jitter_ms: u64,
    pub timeout_secs: u64,
    pub max_text_length: usize,
    pub field_suffix: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Remote,
            source_lang: "EN".to_string(),
            target_lang: "ZH".to_string(),
            endpoints: vec![
                "https://api.deeplx.org/translate".to_string(),
                "https://deeplx.vercel.app/translate".to_string(),
            ],
            request_delay_ms: 1000,
            request_jitter_ms: 1000,
            timeout_secs: 10,
            max_text_length: 4000,
            field_suffix: "zh".to_string(),
        }
    }
}

/// 重试配置，作用于每一个接口地址
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// 每个接口地址的最大尝试次数
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 2000,
            backoff_multiplier: 2.0,
        }
    }
}

/// 批处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 每翻译多少篇文档写一次检查点
    pub checkpoint_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { checkpoint_size: 5 }
    }
}

/// 输入、输出和缓存文件路径
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("public/data/skills_raw.json"),
            output: PathBuf::from("public/data/skills.json"),
            cache: PathBuf::from("translation_cache.json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeepLXRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Deserialize)]
pub struct DeepLXResponse {
    pub code: i32,
    #[serde(default)]
    pub data: String,
}
