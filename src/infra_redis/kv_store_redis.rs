use crate::domain_port::*;
use crate::logger::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub struct RedisKvStore {
    conn: ConnectionManager,
    op_timeout: Duration,
    scan_batch: usize,
}

impl RedisKvStore {
    pub fn new(conn: ConnectionManager, op_timeout: Duration) -> Self {
        RedisKvStore {
            conn,
            op_timeout,
            scan_batch: 500,
        }
    }

    pub async fn connect(dsn: &str, op_timeout: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(dsn)?;
        let conn = bounded(op_timeout, async {
            let conn: ConnectionManager = client.get_connection_manager().await?;
            Ok::<_, StoreError>(conn)
        })
        .await?;
        Ok(Self::new(conn, op_timeout))
    }

    async fn scan_page(&self, cursor: u64, pattern: &str) -> Result<(u64, Vec<String>), StoreError> {
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let page: (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_batch)
                .query_async(&mut conn)
                .await?;
            Ok::<_, StoreError>(page)
        })
        .await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<u64, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let removed: u64 = conn.del(keys).await?;
            Ok::<_, StoreError>(removed)
        })
        .await
    }
}

/// `prefix` as a SCAN pattern that matches only keys starting with it.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[async_trait::async_trait]
impl KvStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, StoreError>(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let _: () = conn.set_ex(key, value, ttl_secs).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let _: u64 = conn.del(key).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn delete_prefix(
        &self,
        prefix: &str,
        exclude: Option<&str>,
    ) -> Result<u64, StoreError> {
        let pattern = prefix_pattern(prefix);
        let mut cursor = 0u64;
        let mut removed = 0u64;
        loop {
            let (next, keys) = self.scan_page(cursor, &pattern).await?;
            let doomed: Vec<String> = keys
                .into_iter()
                .filter(|k| Some(k.as_str()) != exclude)
                .collect();
            removed += self.delete_many(&doomed).await?;
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(prefix, removed, "deleted keys by prefix");
        Ok(removed)
    }

    async fn incr_ex(&self, key: &str, ttl_secs: u64) -> Result<u64, StoreError> {
        let ttl = i64::try_from(ttl_secs)
            .map_err(|_| StoreError::Backend(format!("ttl out of range: {ttl_secs}s")))?;
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, async {
            let count: u64 = conn.incr(key, 1u64).await?;
            if count == 1 {
                let _: bool = conn.expire(key, ttl).await?;
            }
            Ok::<_, StoreError>(count)
        })
        .await
    }
}
