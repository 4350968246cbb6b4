mod application;
mod batch;
mod connection;
mod redis;

pub use application::ApplicationSettings;
pub use batch::BatchConfig;
pub use connection::{
    MAX_IDLE_CONNECTIONS, MAX_LIFETIME_SECS, MAX_OPEN_CONNECTIONS, PgConnectionConfig,
};
pub use self::redis::RedisConfig;
