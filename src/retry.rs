//! 请求节奏与重试模块
//!
//! 每次远程请求之前先等待一段固定时间加随机抖动，失败后按指数退避重试，
//! 重试次数有上限。

use crate::error::Result;
use crate::types::RetryConfig;
use log::warn;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

/// 速率限制器
///
/// 用于控制API请求频率，防止被公共接口封禁。每次请求前调用 `acquire`，
/// 等待 `delay` 加上 `[0, jitter]` 之间的随机时长。
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// 请求间隔延迟
    delay: Duration,
    /// 随机抖动上限
    jitter: Duration,
}

impl RateLimiter {
    /// 创建新的速率限制器
    ///
    /// # 示例
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use skill_translator::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(Duration::from_secs(1), Duration::from_secs(1));
    /// ```
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self { delay, jitter }
    }

    /// 不等待，测试中使用
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// 本次等待的时长
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }

    /// 获取请求许可
    ///
    /// 在发起API请求前调用此方法，确保请求之间保持礼貌间隔。
    pub async fn acquire(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// 带指数退避的重试机制
///
/// 最多执行 `config.max_retries` 次（至少一次），每次执行前先经过速率限制器，
/// 失败后按指数增长的延迟等待再重试。
///
/// # 返回
///
/// * `Ok(T)` - 操作成功的结果
/// * `Err(TranslationError)` - 所有尝试失败后的最后一个错误
pub async fn retry_with_backoff<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
    rate_limiter: &RateLimiter,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let attempts = config.max_retries.max(1);
    let mut delay = config.initial_delay_ms;
    let mut attempt = 1;

    loop {
        rate_limiter.acquire().await;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                warn!("Attempt {}/{} failed: {}. Retrying in {}ms...", attempt, attempts, e, delay);
                if delay > 0 {
                    sleep(Duration::from_millis(delay)).await;
                }
                delay = std::cmp::min(
                    (delay as f64 * config.backoff_multiplier) as u64,
                    config.max_delay_ms,
                );
                attempt += 1;
            }
        }
    }
}
