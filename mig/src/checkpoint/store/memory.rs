use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::checkpoint::store::CheckpointStore;
use crate::error::MigResult;

/// In-memory [`CheckpointStore`] for tests and local runs.
///
/// Offers the same semantics as the Redis-backed store without the
/// durability: checkpoints die with the process.
#[derive(Debug, Clone)]
pub struct MemoryCheckpointStore {
    inner: Arc<Mutex<HashMap<String, i64>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    async fn get(&self, key: &str) -> MigResult<Option<i64>> {
        let inner = self.inner.lock().await;

        Ok(inner.get(key).copied())
    }

    async fn set(&self, key: &str, value: i64) -> MigResult<()> {
        let mut inner = self.inner.lock().await;
        inner.insert(key.to_owned(), value);

        Ok(())
    }

    async fn get_and_set(&self, key: &str, value: i64) -> MigResult<Option<i64>> {
        let mut inner = self.inner.lock().await;

        Ok(inner.insert(key.to_owned(), value))
    }

    async fn clear(&self, key: &str) -> MigResult<()> {
        let mut inner = self.inner.lock().await;
        inner.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_key_reads_as_none() {
        let store = MemoryCheckpointStore::new();
        assert_eq!(store.get("orders").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = MemoryCheckpointStore::new();
        store.set("orders", 1000).await.unwrap();
        assert_eq!(store.get("orders").await.unwrap(), Some(1000));
    }

    #[tokio::test]
    async fn get_and_set_returns_previous_value() {
        let store = MemoryCheckpointStore::new();

        assert_eq!(store.get_and_set("marker", 1).await.unwrap(), None);
        assert_eq!(store.get_and_set("marker", 2).await.unwrap(), Some(1));
        assert_eq!(store.get("marker").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn clear_removes_the_key() {
        let store = MemoryCheckpointStore::new();
        store.set("marker", 42).await.unwrap();
        store.clear("marker").await.unwrap();
        assert_eq!(store.get("marker").await.unwrap(), None);
    }
}
