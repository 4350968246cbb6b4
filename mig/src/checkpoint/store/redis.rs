use mig_config::shared::RedisConfig;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::checkpoint::store::CheckpointStore;
use crate::error::MigResult;

/// Redis-backed [`CheckpointStore`].
///
/// Offsets and run-start markers live as plain integer values under string
/// keys. The connection manager reconnects transparently, so a transient
/// Redis hiccup surfaces as a failed operation rather than a dead handle.
#[derive(Clone)]
pub struct RedisCheckpointStore {
    conn: ConnectionManager,
}

impl RedisCheckpointStore {
    /// Connects to the Redis server described by `config`.
    pub async fn connect(config: &RedisConfig) -> MigResult<Self> {
        let client = redis::Client::open(config.connection_info())?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }
}

impl CheckpointStore for RedisCheckpointStore {
    async fn get(&self, key: &str) -> MigResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = conn.get(key).await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: i64) -> MigResult<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;

        Ok(())
    }

    async fn get_and_set(&self, key: &str, value: i64) -> MigResult<Option<i64>> {
        let mut conn = self.conn.clone();
        let previous: Option<i64> = conn.getset(key, value).await?;

        Ok(previous)
    }

    async fn clear(&self, key: &str) -> MigResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;

        Ok(())
    }
}
