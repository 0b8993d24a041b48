use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::app;
use crate::app::MigrationError;
use crate::cfg;
use crate::core;
use crate::loader;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Migration creation failed")]
    MigrationCreateFailed { #[source] source: MigrationError },

    #[error("Checking migration status failed")]
    MigrationStatusCheckFailed { #[source] source: MigrationError },

    #[error("Running migrations failed")]
    MigrationRunFailed { #[source] source: MigrationError },

    #[error("Failed to render load result: {0}")]
    RenderFailed(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "studentpage")]
#[command(about = "Student roster API and page data loader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the student roster API (default)
    #[default]
    Serve,
    /// Load the student page data once and print it as JSON
    Load,
    /// Database migration utility
    #[command(subcommand)]
    Migrate(MigrateSubCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MigrateSubCommand {
    /// Create a new migration file
    Create {
        /// Name of the migration
        name: String,
    },
    /// List all available migrations
    List,
    /// Check if there are pending migrations
    Status,
    /// Run all pending migrations
    Run,
}

/// Runs the page data loader against the configured source and prints what the page would receive.
///
/// A failed load still prints its `{"error": ...}` shape and is not a CLI error.
pub async fn run_load_cli(settings: &cfg::LoaderSettings) -> Result<loader::LoadResult, CliError> {
    let page_loader = loader::PageDataLoader::with_source(reqwest::Client::new(), settings.source_url.as_str());
    let result = page_loader.load().await;
    println!("{}", render_load_result(&result)?);
    Ok(result)
}

pub fn render_load_result(result: &loader::LoadResult) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub async fn run_migrate_cli(db: &core::DbContext, command: MigrateSubCommand) -> Result<(), CliError> {
    match command {
        MigrateSubCommand::Create { name } => {
            let filename = app::create_migration(&name)
                .map_err(|e| CliError::MigrationCreateFailed { source: e })?;
            println!("Created new migration file: {filename}");
        }
        MigrateSubCommand::List => {
            let migrations = app::list_migrations();
            if migrations.is_empty() {
                println!("No migrations found.");
            } else {
                println!("Available migrations:");
                for migration in &migrations {
                    println!("  {migration}");
                }
            }
        }
        MigrateSubCommand::Status => {
            let pending = app::pending_migrations(db)
                .await
                .map_err(|e| CliError::MigrationStatusCheckFailed { source: e })?;
            if pending.is_empty() {
                println!("Database is up to date. No pending migrations.");
            } else {
                println!("Pending migrations:");
                for migration in &pending {
                    println!("  {migration}");
                }
            }
        }
        MigrateSubCommand::Run => {
            app::run_migrations(db)
                .await
                .map_err(|e| CliError::MigrationRunFailed { source: e })?;
            println!("Migrations applied successfully.");
        }
    }
    Ok(())
}
