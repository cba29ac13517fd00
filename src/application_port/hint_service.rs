use crate::domain_model::*;
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HintError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("bad hint fixture: {0}")]
    Fixture(String),
}

#[async_trait::async_trait]
pub trait HintService: Send + Sync {
    async fn hints(&self, x: i32, y: i32, direction: Direction) -> Result<Vec<Hint>, HintError>;

    async fn import(&self, hints: Vec<NewHint>) -> Result<u64, HintError>;
}
