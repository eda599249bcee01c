//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能。

use crate::backend::remote::default_term_overrides;
use crate::error::{Result, TranslationError};
use crate::translator::default_categories;
use crate::types::{BackendKind, BatchConfig, PathsConfig, RetryConfig, TranslationConfig};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 配置文件的默认查找位置，按顺序尝试
pub const DEFAULT_CONFIG_LOCATIONS: [&str; 3] = [
    "translation-config.toml",
    "config.toml",
    ".translation-config.toml",
];

/// 字典后端的补充词表，会与内置词表合并
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryConfig {
    /// 额外的短语映射
    pub phrases: BTreeMap<String, String>,
    /// 额外的技能名称映射（按 id 匹配）
    pub names: BTreeMap<String, String>,
}

/// 翻译库配置结构
///
/// 包含所有翻译相关的配置选项，支持从TOML文件加载和保存。
///
/// # 示例
///
/// ```rust,no_run
/// use skill_translator::TranslationLibConfig;
///
/// // 从默认位置加载配置
/// let config = TranslationLibConfig::load_from_default_locations();
///
/// // 从指定文件加载配置
/// let config = TranslationLibConfig::from_file("config.toml").unwrap();
///
/// // 保存配置到文件
/// config.save_to_file("output.toml").unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationLibConfig {
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// 远程翻译后的专有名词修正表（错误译法 -> 正确写法）
    #[serde(default = "default_term_overrides")]
    pub terms: BTreeMap<String, String>,
    /// 分类翻译表（小写分类名 -> 译名）
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, String>,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
}

impl Default for TranslationLibConfig {
    fn default() -> Self {
        Self {
            translation: TranslationConfig::default(),
            retry: RetryConfig::default(),
            batch: BatchConfig::default(),
            paths: PathsConfig::default(),
            terms: default_term_overrides(),
            categories: default_categories(),
            dictionary: DictionaryConfig::default(),
        }
    }
}

impl TranslationLibConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TranslationLibConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TranslationError::Config(format!("无法序列化配置: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        for path in &DEFAULT_CONFIG_LOCATIONS {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }

    /// 检查配置中会导致运行失败的取值
    pub fn validate(&self) -> Result<()> {
        if self.batch.checkpoint_size == 0 {
            return Err(TranslationError::Config(
                "batch.checkpoint_size must be at least 1".to_string(),
            ));
        }
        if self.translation.backend == BackendKind::Remote && self.translation.endpoints.is_empty() {
            return Err(TranslationError::Config(
                "translation.endpoints must not be empty for the remote backend".to_string(),
            ));
        }
        if self.translation.max_text_length == 0 {
            return Err(TranslationError::Config(
                "translation.max_text_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
