use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::{StatusCode, header::ContentType},
    web::{Data, Json},
};
use mig::catalog;
use mig::error::MigError;
use mig_config::shared::MAX_OPEN_CONNECTIONS;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::routes::{DbPools, ErrorMessage};

#[derive(Debug, Error)]
pub enum TablesError {
    #[error(transparent)]
    Schema(#[from] MigError),
}

impl ResponseError for TablesError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        let error_message = ErrorMessage {
            error: self.to_string(),
        };
        let body =
            serde_json::to_string(&error_message).expect("failed to serialize error message");
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

/// Connection pool statistics for one database.
#[derive(Debug, Serialize)]
pub struct PoolStatus {
    /// Connections currently held by the pool.
    pub size: u32,
    /// Connections currently idle in the pool.
    pub idle: usize,
    /// Configured ceiling on open connections.
    pub max_open: u32,
}

fn pool_status(pool: &PgPool) -> PoolStatus {
    PoolStatus {
        size: pool.size(),
        idle: pool.num_idle(),
        max_open: MAX_OPEN_CONNECTIONS,
    }
}

#[get("/source/tables")]
pub async fn source_tables(pools: Data<DbPools>) -> Result<impl Responder, TablesError> {
    let tables = catalog::list_tables(&pools.source).await?;

    Ok(Json(tables))
}

#[get("/target/tables")]
pub async fn target_tables(pools: Data<DbPools>) -> Result<impl Responder, TablesError> {
    let tables = catalog::list_tables(&pools.target).await?;

    Ok(Json(tables))
}

#[get("/source/status")]
pub async fn source_status(pools: Data<DbPools>) -> impl Responder {
    Json(pool_status(&pools.source))
}

#[get("/target/status")]
pub async fn target_status(pools: Data<DbPools>) -> impl Responder {
    Json(pool_status(&pools.target))
}
