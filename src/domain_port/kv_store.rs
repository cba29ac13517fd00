use super::StoreError;

/// Key-value store holding liveness markers, cached identities and rate counters.
/// Each call is atomic per key; `delete_prefix` is scan-then-delete and
/// not atomic as a whole.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Deleting an absent key is a no-op.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Delete every key starting with `prefix` except `exclude`. Returns how many
    /// keys were removed.
    async fn delete_prefix(&self, prefix: &str, exclude: Option<&str>)
    -> Result<u64, StoreError>;

    /// Bump the counter at `key` and return the new value. A missing counter
    /// starts at 1 and expires after `ttl_secs`; later bumps keep that expiry.
    async fn incr_ex(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreError>;
}
