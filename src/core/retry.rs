//! 遠端呼叫的重試策略
//!
//! Reporting API 建議遇到 503 時重新送出同一個請求一次；其他錯誤直接往上拋。

use crate::utils::error::{AnalyticsError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// 重試設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 包含第一次呼叫在內的總嘗試次數
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::ZERO,
        }
    }
}

/// 執行 `operation`，遇到暫時性錯誤時依策略重試。
///
/// 重試用盡後，最後一次的暫時性錯誤會升級為 `FatalRequestError`。
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        "Operation '{}' succeeded on attempt {}",
                        operation_name, attempt
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                match e.status() {
                    Some(status) => error!(
                        "HTTP {} calling analytics ({}): {}",
                        status, operation_name, e
                    ),
                    None => error!("Operation '{}' failed: {}", operation_name, e),
                }

                if !e.is_transient() {
                    return Err(e);
                }

                if attempt >= max_attempts {
                    return Err(AnalyticsError::FatalRequestError {
                        status: e.status(),
                        message: format!("{} (gave up after {} attempts)", e, attempt),
                    });
                }

                warn!(
                    "Operation '{}' hit a transient error (attempt {}/{}); retrying",
                    operation_name, attempt, max_attempts
                );
                if !policy.delay.is_zero() {
                    sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}
