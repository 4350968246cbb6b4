use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::Password;

/// Maximum number of open connections per database pool.
pub const MAX_OPEN_CONNECTIONS: u32 = 100;

/// Number of warm connections kept per database pool.
///
/// sqlx has no separate idle cap, so the idle tuning maps onto the pool's
/// connection floor.
pub const MAX_IDLE_CONNECTIONS: u32 = 10;

/// Maximum lifetime of a pooled connection, in seconds.
pub const MAX_LIFETIME_SECS: u64 = 3600;

/// Configuration for connecting to one of the two Postgres databases.
///
/// Field names follow the environment variable contract: `DB_SOURCE_HOST`,
/// `DB_SOURCE_PORT`, `DB_SOURCE_USER`, `DB_SOURCE_PASSWORD` and
/// `DB_SOURCE_NAME` (and the `DB_TARGET_*` equivalents).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PgConnectionConfig {
    /// Hostname or IP address of the Postgres server.
    pub host: String,
    /// Port number on which the Postgres server is listening.
    pub port: u16,
    /// Username for authenticating with the Postgres server.
    pub user: String,
    /// Password for the specified user. Sensitive and redacted in debug output.
    pub password: Option<Password>,
    /// Name of the Postgres database to connect to.
    pub name: String,
}

impl PgConnectionConfig {
    /// Creates sqlx connection options for this database.
    pub fn with_db(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name)
            .ssl_mode(PgSslMode::Prefer);

        if let Some(password) = &self.password {
            options.password(password.expose())
        } else {
            options
        }
    }
}
