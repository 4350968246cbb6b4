use std::net::TcpListener;
use std::time::Duration;

use actix_web::{App, HttpServer, dev::Server, web};
use mig::checkpoint::RedisCheckpointStore;
use mig::concurrency::shutdown::ShutdownTx;
use mig::migrator::Migrator;
use mig_config::AppConfig;
use mig_config::shared::{
    BatchConfig, MAX_IDLE_CONNECTIONS, MAX_LIFETIME_SECS, MAX_OPEN_CONNECTIONS,
    PgConnectionConfig,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_actix_web::TracingLogger;

use crate::routes::{
    DbPools,
    migration::{init_migration, migration_status, sync_migration},
    ping::ping,
    tables::{source_status, source_tables, target_status, target_tables},
};

/// Base path of the control API resource tree.
const BASE_PATH: &str = "/validator";

pub struct Application {
    port: u16,
    server: Server,
    shutdown: ShutdownTx,
}

impl Application {
    /// Builds the application: database pools, checkpoint store, migrator
    /// and the bound HTTP server.
    ///
    /// The database pools connect lazily; only the Redis connection and
    /// the listener bind are validated here.
    pub async fn build(config: AppConfig) -> Result<Self, anyhow::Error> {
        let source = get_connection_pool(&config.source);
        let target = get_connection_pool(&config.target);

        let store = RedisCheckpointStore::connect(&config.redis).await?;
        let migrator = Migrator::new(
            source.clone(),
            target.clone(),
            store,
            BatchConfig::default(),
            config.application.max_table_workers,
        );
        let shutdown = migrator.shutdown_handle();

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, source, target, migrator)?;

        Ok(Self {
            port,
            server,
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Handle that cancels in-flight migration runs when triggered.
    pub fn shutdown_handle(&self) -> ShutdownTx {
        self.shutdown.clone()
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Builds a lazily-connecting pool with the validator's tuning.
pub fn get_connection_pool(config: &PgConnectionConfig) -> PgPool {
    PgPoolOptions::new()
        .max_connections(MAX_OPEN_CONNECTIONS)
        .min_connections(MAX_IDLE_CONNECTIONS)
        .max_lifetime(Duration::from_secs(MAX_LIFETIME_SECS))
        .connect_lazy_with(config.with_db())
}

pub fn run(
    listener: TcpListener,
    source: PgPool,
    target: PgPool,
    migrator: Migrator<RedisCheckpointStore>,
) -> Result<Server, anyhow::Error> {
    let pools = web::Data::new(DbPools { source, target });
    let migrator = web::Data::new(migrator);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(
                web::scope(BASE_PATH)
                    .service(ping)
                    .service(source_tables)
                    .service(source_status)
                    .service(target_tables)
                    .service(target_status)
                    .service(migration_status)
                    .service(init_migration)
                    .service(sync_migration),
            )
            .app_data(pools.clone())
            .app_data(migrator.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
