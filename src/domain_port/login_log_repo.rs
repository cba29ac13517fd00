use super::StoreError;
use crate::domain_model::*;

/// Append-only audit of login attempts.
#[async_trait::async_trait]
pub trait LoginLogRepo: Send + Sync {
    async fn create(&self, entry: NewLoginLog) -> Result<(), StoreError>;
}
