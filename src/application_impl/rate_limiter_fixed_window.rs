use crate::application_port::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;
use std::time::Duration;

/// Fixed-window counter kept in the key-value store under
/// `{namespace}:{key}`. The window starts at the first hit.
pub struct FixedWindowRateLimiter {
    store: Arc<dyn KvStore>,
    namespace: String,
    limit: u64,
    window: Duration,
}

impl FixedWindowRateLimiter {
    pub fn new(store: Arc<dyn KvStore>, namespace: String, limit: u64, window: Duration) -> Self {
        FixedWindowRateLimiter {
            store,
            namespace,
            limit,
            window,
        }
    }
}

#[async_trait::async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn hit(&self, key: &str) -> Result<(), RateLimitError> {
        let window_secs = self.window.as_secs().max(1);
        let counter = format!("{}:{key}", self.namespace);
        let count = self.store.incr_ex(&counter, window_secs).await?;
        if count > self.limit {
            debug!(counter, count, limit = self.limit, "rate limit exceeded");
            return Err(RateLimitError::Exceeded {
                retry_after_secs: window_secs,
            });
        }
        Ok(())
    }
}
