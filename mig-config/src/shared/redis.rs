use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::Deserialize;

use crate::Password;

/// Default logical database index when `REDIS_DB` is not set.
fn default_db() -> i64 {
    0
}

/// Configuration for connecting to the Redis checkpoint store.
///
/// Field names follow the environment variable contract: `REDIS_HOST`,
/// `REDIS_PORT`, `REDIS_PASSWORD` and `REDIS_DB`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RedisConfig {
    /// Hostname or IP address of the Redis server.
    pub host: String,
    /// Port number on which the Redis server is listening.
    pub port: u16,
    /// Password for the Redis server. Sensitive and redacted in debug output.
    pub password: Option<Password>,
    /// Logical database index to select after connecting.
    #[serde(default = "default_db")]
    pub db: i64,
}

impl RedisConfig {
    /// Creates client connection info for this Redis server.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: self.db,
                password: self
                    .password
                    .as_ref()
                    .map(|password| password.expose().to_owned()),
                ..Default::default()
            },
        }
    }
}
