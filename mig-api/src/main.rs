use mig_api::startup::Application;
use mig_config::{AppConfig, load_config};
use mig_telemetry::init_tracing;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name.
    init_tracing(env!("CARGO_BIN_NAME"))?;

    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    let config = load_config()?;
    log_database_config(&config);

    let application = Application::build(config).await?;
    info!(port = application.port(), "control api listening");

    // Ctrl-C stops the server; in-flight runs are cancelled so their
    // workers checkpoint out at the next batch boundary.
    let shutdown = application.shutdown_handle();
    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, cancelling in-flight runs");
            let _ = shutdown.shutdown();
        }
    });

    application.run_until_stopped().await?;

    Ok(())
}

fn log_database_config(config: &AppConfig) {
    info!(
        host = config.source.host,
        port = config.source.port,
        dbname = config.source.name,
        user = config.source.user,
        "source database options",
    );
    info!(
        host = config.target.host,
        port = config.target.port,
        dbname = config.target.name,
        user = config.target.user,
        "target database options",
    );
}
