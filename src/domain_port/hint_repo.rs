use super::StoreError;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait HintRepo: Send + Sync {
    async fn find_in_window(&self, window: &HintWindow) -> Result<Vec<Hint>, StoreError>;

    async fn insert_many(&self, hints: &[NewHint]) -> Result<u64, StoreError>;
}
