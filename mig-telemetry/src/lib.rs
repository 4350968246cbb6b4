//! Tracing initialization for the validator binaries.
//!
//! Deployed environments log JSON to stdout for collection, development
//! logs human-readable output. Both honor `RUST_LOG`.

use std::sync::Once;

use mig_config::Environment;
use thiserror::Error;
use tracing::info;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to load the environment: {0}")]
    Environment(#[from] std::io::Error),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Initializes the global tracing subscriber for a binary.
///
/// Must be called once, before any spans or events are emitted.
pub fn init_tracing(service_name: &str) -> Result<(), TracingError> {
    let environment = Environment::load()?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if environment.is_prod() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .finish();
        set_global_default(subscriber)?;
    }

    info!(service = service_name, %environment, "tracing initialized");

    Ok(())
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for test runs.
///
/// Call at the beginning of tests. Output is only emitted when
/// `ENABLE_TRACING=1` is set:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            Environment::Dev.set();
            init_tracing("test").expect("Failed to initialize tracing for tests");
        }
    });
}
