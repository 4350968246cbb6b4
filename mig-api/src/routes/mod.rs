use serde::{Deserialize, Serialize};
use sqlx::PgPool;

pub mod migration;
pub mod ping;
pub mod tables;

/// JSON body returned by every failing route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: String,
}

/// The two pooled database handles, shared across requests.
#[derive(Debug, Clone)]
pub struct DbPools {
    pub source: PgPool,
    pub target: PgPool,
}
