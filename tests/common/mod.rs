//! 集成测试共用的模拟接口和文档

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use skill_translator::{
    CacheStore, Document, Endpoint, RateLimiter, RemoteBackend, RetryConfig, TranslationError,
};

/// 模拟接口的行为
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// 转成大写
    Uppercase,
    /// 总是返回连接错误
    Refuse,
}

/// 记录调用次数的模拟翻译接口
pub struct MockEndpoint {
    reply: Reply,
    calls: Arc<AtomicUsize>,
}

impl MockEndpoint {
    pub fn new(reply: Reply) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Endpoint for MockEndpoint {
    fn url(&self) -> &str {
        "mock://translate"
    }

    async fn request(&self, text: &str) -> skill_translator::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::Uppercase => Ok(text.to_uppercase()),
            Reply::Refuse => Err(TranslationError::Custom("connection refused".to_string())),
        }
    }
}

/// 不等待、不退避的远程后端
pub fn remote_backend(reply: Reply, cache: CacheStore) -> (RemoteBackend, Arc<AtomicUsize>) {
    let (endpoint, calls) = MockEndpoint::new(reply);
    let backend = RemoteBackend::new(vec![Box::new(endpoint)], cache)
        .with_rate_limiter(RateLimiter::disabled())
        .with_retry(RetryConfig {
            max_retries: 2,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            backoff_multiplier: 1.0,
        });
    (backend, calls)
}

pub const SKILL_BODY: &str = "# Webapp Testing\n\n\
Use this skill to test `localhost` apps.\n\n\
## Quick Start\n\n\
```bash\n\
python scripts/with_server.py --port 5173\n\
npm run dev\n\
```\n\n\
- Run `npm test` before pushing\n\
1. Open the page\n\
---\n";

pub fn skill_record(i: usize) -> Value {
    json!({
        "id": format!("skill-{}", i),
        "name": format!("webapp testing {}", i),
        "description": "Test local web applications",
        "category": "testing",
        "tags": ["web", "testing"],
        "body": SKILL_BODY,
        "source": "anthropics-skills"
    })
}

pub fn skill_documents(n: usize) -> Vec<Document> {
    (0..n).map(|i| Document::from_record(skill_record(i))).collect()
}
