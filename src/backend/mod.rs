//! 翻译后端
//!
//! 所有后端都实现 [`TranslationBackend`]，调用方只依赖这个能力，不关心具体是
//! 离线字典还是远程接口：
//! - [`DictionaryBackend`]: 离线、确定性的词表替换
//! - [`RemoteBackend`]: 带缓存、重试和多接口切换的远程翻译

use async_trait::async_trait;
use std::time::Duration;

use crate::cache::{CacheStats, CacheStore};
use crate::config::TranslationLibConfig;
use crate::error::Result;
use crate::retry::RateLimiter;
use crate::types::BackendKind;

pub mod deeplx;
pub mod dictionary;
pub mod remote;

pub use deeplx::{DeepLXEndpoint, Endpoint};
pub use dictionary::DictionaryBackend;
pub use remote::{RemoteBackend, TermOverrides};

/// 把一段文本翻译成目标语言
///
/// 翻译永远不会失败：无法翻译时返回原文。实现方不会收到空白文本，
/// 调用方应通过 [`translate_text`] 调用。
#[async_trait]
pub trait TranslationBackend: Send {
    /// 后端名称，用于日志
    fn name(&self) -> &str;

    /// 翻译一段非空文本
    async fn translate_span(&mut self, text: &str) -> String;

    /// 按技能 id 查找固定译名，没有名称表的后端返回 `None`
    fn known_name(&self, _id: &str) -> Option<String> {
        None
    }

    /// 缓存命中统计，没有缓存的后端返回 `None`
    fn cache_stats(&self) -> Option<CacheStats> {
        None
    }
}

/// 翻译文本，空白文本直接原样返回而不调用后端
pub async fn translate_text(backend: &mut dyn TranslationBackend, text: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    backend.translate_span(text).await
}

/// 根据配置创建翻译后端
pub fn create_backend(config: &TranslationLibConfig) -> Result<Box<dyn TranslationBackend>> {
    match config.translation.backend {
        BackendKind::Dictionary => {
            let backend = DictionaryBackend::builtin()
                .with_phrases(&config.dictionary.phrases)
                .with_names(&config.dictionary.names);
            Ok(Box::new(backend))
        }
        BackendKind::Remote => {
            let translation = &config.translation;
            let timeout = Duration::from_secs(translation.timeout_secs);
            let endpoints = translation
                .endpoints
                .iter()
                .map(|url| {
                    Box::new(DeepLXEndpoint::new(
                        url,
                        &translation.source_lang,
                        &translation.target_lang,
                        timeout,
                    )) as Box<dyn Endpoint>
                })
                .collect();

            let backend = RemoteBackend::new(endpoints, CacheStore::load(&config.paths.cache))
                .with_retry(config.retry.clone())
                .with_rate_limiter(RateLimiter::new(
                    Duration::from_millis(translation.request_delay_ms),
                    Duration::from_millis(translation.request_jitter_ms),
                ))
                .with_overrides(TermOverrides::new(&config.terms))
                .with_max_text_length(translation.max_text_length);
            Ok(Box::new(backend))
        }
    }
}
