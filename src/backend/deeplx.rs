//! DeepLX 接口客户端
//!
//! 一个 [`Endpoint`] 对应一个翻译服务地址，只负责一次请求和响应解析；
//! 重试、缓存和地址切换由 [`RemoteBackend`](super::RemoteBackend) 负责。

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::{Result, TranslationError};
use crate::types::{DeepLXRequest, DeepLXResponse};

/// 单个远程翻译服务地址
#[async_trait]
pub trait Endpoint: Send + Sync {
    /// 服务地址，用于日志
    fn url(&self) -> &str;

    /// 发送一次翻译请求
    async fn request(&self, text: &str) -> Result<String>;
}

/// DeepLX 兼容接口
pub struct DeepLXEndpoint {
    /// HTTP客户端，用于API调用
    client: Client,
    url: String,
    source_lang: String,
    target_lang: String,
}

impl DeepLXEndpoint {
    pub fn new(url: &str, source_lang: &str, target_lang: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent("Mozilla/5.0 (compatible; SkillTranslator/1.0)")
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to create optimized client: {}, using default", e);
                Client::new()
            });

        Self {
            client,
            url: url.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

#[async_trait]
impl Endpoint for DeepLXEndpoint {
    fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, text: &str) -> Result<String> {
        debug!("发送翻译请求到: {} ({} 字符)", self.url, text.chars().count());

        let request = DeepLXRequest {
            text: text.to_string(),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
        };

        let response = self
            .client
            .post(&self.url)
            .header("Accept", "application/json, text/plain, */*")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

/// 解析 DeepLX 及其常见变体的响应
///
/// 支持 `{"code":200,"data":"..."}`，也兼容把译文放在 `translated_text`、
/// `result`、`translation`、`data` 字段里的 JSON，以及纯文本响应。
/// 空译文视为失败。
pub fn parse_response(status: StatusCode, body: &str) -> Result<String> {
    if !status.is_success() {
        return Err(TranslationError::ApiError {
            code: status.as_u16() as i32,
            message: format!("DeepLX API请求失败: {} - {}", status, body.trim()),
        });
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(TranslationError::ParseError("API返回了空的翻译结果".to_string()));
    }

    let translated = if let Ok(result) = serde_json::from_str::<DeepLXResponse>(trimmed) {
        if result.code != 200 {
            return Err(TranslationError::ApiError {
                code: result.code,
                message: format!("DeepLX翻译失败，返回代码: {}", result.code),
            });
        }
        result.data
    } else if trimmed.starts_with('{') {
        let json_value: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|_| TranslationError::ParseError(format!("无法解析JSON响应: {}", trimmed)))?;
        json_value
            .get("translated_text")
            .or_else(|| json_value.get("result"))
            .or_else(|| json_value.get("translation"))
            .or_else(|| json_value.get("data"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                TranslationError::ParseError(format!("无法从JSON响应中提取翻译结果: {}", trimmed))
            })?
    } else {
        trimmed.to_string()
    };

    if translated.trim().is_empty() {
        Err(TranslationError::ParseError("DeepLX返回了空的翻译结果".to_string()))
    } else {
        Ok(translated)
    }
}
