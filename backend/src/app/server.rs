use std::error::Error;
use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app;
use crate::cfg;
use crate::core;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigLoadingFailed(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    DatabaseOperationFailed(#[from] core::DbError),

    #[error("Migration error: {0}")]
    MigrationFailed(#[from] app::MigrationError),

    #[error("CLI error: {0}")]
    CliOperationFailed(#[from] app::CliError),

    #[error("Network address parsing error: {0}")]
    AddressParsingFailed(#[from] std::net::AddrParseError),

    #[error("Server error: {0}")]
    ServerStartingFailed(#[from] std::io::Error),
}

pub async fn run() {
    if let Err(e) = run_app().await {
        eprintln!("❌ {e}\n");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("Caused by: {err}");
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run_app() -> Result<(), AppError> {
    let cli = app::Cli::parse();
    let settings = cfg::AppSettings::new()?;
    init_tracing(&settings.server.log_directives);

    match cli.command.unwrap_or_default() {
        app::Command::Serve => serve(settings).await,
        app::Command::Load => {
            app::run_load_cli(&settings.loader).await?;
            Ok(())
        }
        app::Command::Migrate(command) => {
            let db = core::create_db_context(&settings.database).await?;
            app::run_migrate_cli(&db, command).await?;
            Ok(())
        }
    }
}

fn init_tracing(log_directives: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_directives))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(settings: cfg::AppSettings) -> Result<(), AppError> {
    let db = core::create_db_context(&settings.database).await?;
    app::run_migrations(&db).await?;

    let server_address = settings.get_server_address();
    let address = server_address.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;

    tracing::info!("🚀 starting server");
    tracing::info!("   app_env: {}", cfg::AppSettings::get_app_run_env());
    tracing::info!("   cfg_dir: {}", cfg::AppSettings::get_config_full_path());
    tracing::info!("   logging: {}", settings.server.log_directives);
    tracing::info!("   address: http://{server_address}");

    let context = core::Context::new(db, settings);
    let router = app::create_router(context);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Waits for CTRL+C; passed to `with_graceful_shutdown`.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, shutting down gracefully"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
