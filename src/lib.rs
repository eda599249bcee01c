//! # Skill Translator
//!
//! 技能描述文档（带元数据的 Markdown）的保格式翻译库。
//!
//! ## 主要特性
//!
//! - **代码保护**: 围栏代码块和行内代码在翻译前替换为占位符，翻译后原样还原
//! - **逐行翻译**: 标题层级、列表标记、分隔线和行数保持不变
//! - **可替换后端**: 离线字典后端和带多接口切换的远程 DeepLX 后端
//! - **持久缓存**: 相同原文只请求一次，缓存文件在每次新增后落盘
//! - **断点保存**: 批量翻译定期写出完整合法的 JSON，中断时保存已翻译内容
//!
//! ## 快速开始
//!
//! ```rust
//! use skill_translator::{DictionaryBackend, Document, DocumentTranslator};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let translator = DocumentTranslator::default();
//! let mut backend = DictionaryBackend::builtin();
//!
//! let document = Document::from_record(json!({
//!     "id": "pdf",
//!     "name": "pdf",
//!     "category": "tools",
//!     "body": "## Usage\nRun `extract.py` on the file."
//! }));
//!
//! let translated = translator.translate(&document, &mut backend).await;
//! assert_eq!(translated.category.as_deref(), Some("工具"));
//! assert!(translated.body.unwrap().contains("`extract.py`"));
//! # });
//! ```
//!
//! ## 配置文件支持
//!
//! ```toml
//! [translation]
//! backend = "remote"
//! source_lang = "EN"
//! target_lang = "ZH"
//! endpoints = ["https://api.deeplx.org/translate"]
//! request_delay_ms = 1000
//! request_jitter_ms = 1000
//!
//! [batch]
//! checkpoint_size = 5
//!
//! [paths]
//! input = "public/data/skills_raw.json"
//! output = "public/data/skills.json"
//! cache = "translation_cache.json"
//! ```

pub mod backend;
pub mod batch;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod protector;
pub mod retry;
pub mod translator;
pub mod types;

pub use backend::{
    create_backend, translate_text, DeepLXEndpoint, DictionaryBackend, Endpoint, RemoteBackend,
    TermOverrides, TranslationBackend,
};
pub use batch::{BatchOutcome, BatchRunner};
pub use cache::{CacheStats, CacheStore};
pub use classifier::{classify, ClassifiedLine, LineKind};
pub use config::{DictionaryConfig, TranslationLibConfig};
pub use document::{load_documents, Document, TranslatedDocument};
pub use error::{Result, TranslationError};
pub use protector::{protect, ProtectedBody, ProtectedSpan, SpanKind};
pub use retry::{retry_with_backoff, RateLimiter};
pub use translator::{default_categories, DocumentTranslator};
pub use types::{
    BackendKind, BatchConfig, DeepLXRequest, DeepLXResponse, PathsConfig, RetryConfig,
    TranslationConfig,
};
