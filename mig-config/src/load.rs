use serde::de::DeserializeOwned;

use crate::shared::{ApplicationSettings, PgConnectionConfig, RedisConfig};

/// Prefix for the source database environment variables.
const DB_SOURCE_ENV_PREFIX: &str = "DB_SOURCE";

/// Prefix for the target database environment variables.
const DB_TARGET_ENV_PREFIX: &str = "DB_TARGET";

/// Prefix for the Redis checkpoint store environment variables.
const REDIS_ENV_PREFIX: &str = "REDIS";

/// Prefix for the application settings environment variables.
const APP_ENV_PREFIX: &str = "APP";

/// Separator between environment variable prefix and key segments.
///
/// Example: `DB_SOURCE_HOST` sets the `host` field of the source database
/// configuration.
const ENV_PREFIX_SEPARATOR: &str = "_";

/// Complete configuration for the validator, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection settings for the source database.
    pub source: PgConnectionConfig,
    /// Connection settings for the target database.
    pub target: PgConnectionConfig,
    /// Connection settings for the Redis checkpoint store.
    pub redis: RedisConfig,
    /// HTTP listener and fan-out settings.
    pub application: ApplicationSettings,
}

/// Loads the full validator configuration from environment variables.
///
/// Recognized options are `DB_SOURCE_{HOST,PORT,USER,PASSWORD,NAME}`,
/// `DB_TARGET_{HOST,PORT,USER,PASSWORD,NAME}`,
/// `REDIS_{HOST,PORT,PASSWORD,DB}` and
/// `APP_{HOST,PORT,MAX_TABLE_WORKERS}`.
pub fn load_config() -> Result<AppConfig, config::ConfigError> {
    Ok(AppConfig {
        source: from_env(DB_SOURCE_ENV_PREFIX)?,
        target: from_env(DB_TARGET_ENV_PREFIX)?,
        redis: from_env(REDIS_ENV_PREFIX)?,
        application: from_env(APP_ENV_PREFIX)?,
    })
}

/// Deserializes one configuration section from prefixed environment variables.
fn from_env<T>(prefix: &str) -> Result<T, config::ConfigError>
where
    T: DeserializeOwned,
{
    let environment_source = config::Environment::with_prefix(prefix)
        .prefix_separator(ENV_PREFIX_SEPARATOR);

    config::Config::builder()
        .add_source(environment_source)
        .build()?
        .try_deserialize::<T>()
}

#[cfg(test)]
mod tests {
    use super::*;

    // All environment mutation lives in this single test to avoid races
    // between parallel test threads.
    #[test]
    fn config_loads_from_prefixed_environment_variables() {
        let vars = [
            ("DB_SOURCE_HOST", "src.db.local"),
            ("DB_SOURCE_PORT", "5432"),
            ("DB_SOURCE_USER", "app"),
            ("DB_SOURCE_PASSWORD", "hunter2"),
            ("DB_SOURCE_NAME", "inventory"),
            ("DB_TARGET_HOST", "tgt.db.local"),
            ("DB_TARGET_PORT", "5433"),
            ("DB_TARGET_USER", "app"),
            ("DB_TARGET_NAME", "inventory"),
            ("REDIS_HOST", "redis.local"),
            ("REDIS_PORT", "6379"),
        ];
        for (key, value) in vars {
            unsafe { std::env::set_var(key, value) };
        }

        let config = load_config().unwrap();

        assert_eq!(config.source.host, "src.db.local");
        assert_eq!(config.source.port, 5432);
        assert_eq!(
            config.source.password.as_ref().unwrap().expose(),
            "hunter2"
        );
        assert_eq!(config.target.host, "tgt.db.local");
        assert_eq!(config.target.port, 5433);
        assert!(config.target.password.is_none());
        assert_eq!(config.redis.host, "redis.local");
        assert_eq!(config.redis.db, 0);
        assert_eq!(config.application.port, 3000);
        assert_eq!(config.application.max_table_workers, 8);

        for (key, _) in vars {
            unsafe { std::env::remove_var(key) };
        }
    }
}
