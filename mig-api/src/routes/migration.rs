use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::{StatusCode, header::ContentType},
    post,
    web::{Data, Json},
};
use mig::checkpoint::RedisCheckpointStore;
use mig::error::MigError;
use mig::migrator::Migrator;
use thiserror::Error;

use crate::routes::ErrorMessage;

#[derive(Debug, Error)]
pub enum MigrationError {
    /// The status listing could not be assembled.
    #[error(transparent)]
    Status(MigError),

    /// A triggered run did not complete cleanly.
    #[error(transparent)]
    Run(MigError),
}

impl ResponseError for MigrationError {
    fn status_code(&self) -> StatusCode {
        match self {
            MigrationError::Status(_) => StatusCode::BAD_REQUEST,
            MigrationError::Run(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
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

#[get("/migration/status")]
pub async fn migration_status(
    migrator: Data<Migrator<RedisCheckpointStore>>,
) -> Result<impl Responder, MigrationError> {
    let status = migrator
        .status()
        .await
        .map_err(MigrationError::Status)?;

    Ok(Json(status))
}

#[post("/migration/init")]
pub async fn init_migration(
    migrator: Data<Migrator<RedisCheckpointStore>>,
) -> Result<impl Responder, MigrationError> {
    let started_at = migrator.run_copy().await.map_err(MigrationError::Run)?;

    Ok(HttpResponse::Created().json(format!("DataCopy started at {started_at}")))
}

#[post("/migration/sync")]
pub async fn sync_migration(
    migrator: Data<Migrator<RedisCheckpointStore>>,
) -> Result<impl Responder, MigrationError> {
    let started_at = migrator.run_sync().await.map_err(MigrationError::Run)?;

    Ok(HttpResponse::Created().json(format!("DataSync started at {started_at}")))
}
