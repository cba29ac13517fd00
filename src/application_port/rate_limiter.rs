use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded, retry within {retry_after_secs}s")]
    Exceeded { retry_after_secs: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counts hits per caller key and refuses them once the window is full.
#[async_trait::async_trait]
pub trait RateLimiter: Send + Sync {
    async fn hit(&self, key: &str) -> Result<(), RateLimitError>;
}
