use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryLoginLogRepo {
    entries: Mutex<Vec<NewLoginLog>>,
}

impl MemoryLoginLogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot in insertion order.
    pub fn entries(&self) -> Vec<NewLoginLog> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LoginLogRepo for MemoryLoginLogRepo {
    async fn create(&self, entry: NewLoginLog) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .push(entry);
        Ok(())
    }
}
