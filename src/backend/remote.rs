//! 远程翻译后端
//!
//! 单个翻译单元的处理流程：
//!
//! ```text
//! Pending ──缓存命中──> CacheHit
//!    │
//!    └──> Calling ──成功──> Success（写入缓存并立即落盘）
//!           │  ↑
//!           ↓  │ 重试（每个地址最多 max_retries 次）
//!         Failure ──所有地址耗尽──> Exhausted（返回原文，不写缓存）
//! ```

use async_trait::async_trait;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{Endpoint, TranslationBackend};
use crate::cache::{truncate_text, CacheStats, CacheStore};
use crate::error::TranslationError;
use crate::retry::{retry_with_backoff, RateLimiter};
use crate::types::RetryConfig;

/// 默认的专有名词修正表，修正远程服务常见的误译
pub fn default_term_overrides() -> BTreeMap<String, String> {
    [
        ("克劳德", "Claude"),
        ("人择", "Anthropic"),
        ("世博会", "Expo"),
        ("降价", "Markdown"),
        ("神器", "Artifacts"),
        ("Agent", "智能体"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// 翻译完成后再应用的固定术语替换
#[derive(Debug, Clone, Default)]
pub struct TermOverrides {
    terms: Vec<(String, String)>,
}

impl TermOverrides {
    pub fn new(terms: &BTreeMap<String, String>) -> Self {
        let mut terms: Vec<(String, String)> = terms
            .iter()
            .filter(|(from, _)| !from.is_empty())
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();
        terms.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { terms }
    }

    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (from, to) in &self.terms {
            if result.contains(from.as_str()) {
                result = result.replace(from.as_str(), to);
            }
        }
        result
    }
}

/// 远程翻译后端
///
/// 持有翻译缓存，先查缓存，未命中时依次尝试每个接口地址。所有地址都失败时
/// 返回原文，不会把错误抛给调用方。
pub struct RemoteBackend {
    endpoints: Vec<Box<dyn Endpoint>>,
    cache: CacheStore,
    retry: RetryConfig,
    rate_limiter: RateLimiter,
    overrides: TermOverrides,
    max_text_length: usize,
}

impl RemoteBackend {
    pub fn new(endpoints: Vec<Box<dyn Endpoint>>, cache: CacheStore) -> Self {
        Self {
            endpoints,
            cache,
            retry: RetryConfig::default(),
            rate_limiter: RateLimiter::new(Duration::from_secs(1), Duration::from_secs(1)),
            overrides: TermOverrides::default(),
            max_text_length: 4000,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_overrides(mut self, overrides: TermOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_max_text_length(mut self, max_text_length: usize) -> Self {
        self.max_text_length = max_text_length.max(1);
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// 依次尝试每个地址，全部失败时返回 `None`
    async fn call_endpoints(&self, text: &str) -> Option<String> {
        for endpoint in &self.endpoints {
            let result = retry_with_backoff(
                || async move {
                    match endpoint.request(text).await {
                        Ok(translated) if translated.trim().is_empty() => Err(
                            TranslationError::ParseError("翻译服务返回了空结果".to_string()),
                        ),
                        other => other,
                    }
                },
                &self.retry,
                &self.rate_limiter,
            )
            .await;

            match result {
                Ok(translated) => {
                    debug!("Translated via {}: {}", endpoint.url(), truncate_text(&translated, 20));
                    return Some(translated);
                }
                Err(e) => warn!("端点 {} 失败: {}", endpoint.url(), e),
            }
        }
        None
    }
}

#[async_trait]
impl TranslationBackend for RemoteBackend {
    fn name(&self) -> &str {
        "remote"
    }

    fn cache_stats(&self) -> Option<CacheStats> {
        Some(self.cache.stats())
    }

    async fn translate_span(&mut self, text: &str) -> String {
        if let Some(cached) = self.cache.get(text) {
            return cached;
        }

        let pieces = if text.chars().count() > self.max_text_length {
            debug!("文本过长 ({} 字符)，按句子切分翻译", text.chars().count());
            split_long_text(text, self.max_text_length)
        } else {
            vec![text.to_string()]
        };

        let mut translated_pieces = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            match self.call_endpoints(piece).await {
                Some(translated) => translated_pieces.push(translated),
                None => {
                    warn!("所有翻译端点均失败，保留原文: {}", truncate_text(text, 40));
                    return text.to_string();
                }
            }
        }

        let translated = self.overrides.apply(&translated_pieces.join(" "));
        self.cache.insert(text, &translated);
        if let Err(e) = self.cache.flush() {
            warn!("Failed to persist translation cache: {}", e);
        }
        translated
    }
}

/// 把过长的文本按句子边界切分，找不到句子边界时按空白切分
fn split_long_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = std::cmp::min(start + max_chars, chars.len());
        let mut actual_end = end;

        if end < chars.len() {
            let sentence_end = (start..end)
                .rev()
                .find(|&i| matches!(chars[i], '.' | '!' | '?' | '。' | '！' | '？'));
            let space_end = || (start..end).rev().find(|&i| chars[i].is_whitespace());
            if let Some(i) = sentence_end.or_else(space_end) {
                actual_end = i + 1;
            }
        }

        let chunk: String = chars[start..actual_end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        start = actual_end;
    }

    chunks
}
