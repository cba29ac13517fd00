use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local store with TTLs evaluated against an injected clock.
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MemoryKvStore {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn live_entries(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        let now = self.clock.now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(entries)
    }

    fn expiry(&self, ttl_secs: u64) -> Result<DateTime<Utc>, StoreError> {
        i64::try_from(ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| StoreError::Backend(format!("ttl out of range: {ttl_secs}s")))
    }

    /// Live keys under `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = match self.live_entries() {
            Ok(entries) => entries
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        };
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.live_entries()?;
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let expires_at = self.expiry(ttl_secs)?;
        let mut entries = self.live_entries()?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.live_entries()?;
        entries.remove(key);
        Ok(())
    }

    async fn delete_prefix(
        &self,
        prefix: &str,
        exclude: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut entries = self.live_entries()?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix) || Some(key.as_str()) == exclude);
        Ok((before - entries.len()) as u64)
    }

    async fn incr_ex(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreError> {
        let expires_at = self.expiry(ttl_secs)?;
        let mut entries = self.live_entries()?;
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expires_at,
        });
        let count = entry
            .value
            .parse::<u64>()
            .map_err(|e| StoreError::Corrupt(format!("{key} is not a counter: {e}")))?
            .saturating_add(1);
        entry.value = count.to_string();
        Ok(count)
    }
}
