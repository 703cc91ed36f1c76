//! Contributor sync job
//!
//! Fetches the target repository's contributors from GitHub and upserts them
//! into the contributors table.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;

use contrib_sync::adapters::{GitHubClientImpl, PostgresContributorRepository, TableNames};
use contrib_sync::app::ContributorSyncService;
use contrib_sync::config::Config;
use contrib_sync::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Contributor sync failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let target = config.require_target_repo()?.clone();
    let tables = TableNames::select(config.use_replica_tables);
    tracing::info!(repository = %target, table = %tables.contributors, "Starting contributor sync");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let contributors = Arc::new(PostgresContributorRepository::new(db, tables));
    let github = Arc::new(
        GitHubClientImpl::new(config.github_api_url, config.github_token)
            .context("Failed to build GitHub client")?,
    );

    let service = ContributorSyncService::new(contributors, github);
    let report = service.sync(&target.owner, &target.name).await?;

    tracing::info!(
        repository = %report.repository,
        fetched = report.fetched,
        upserted = report.upserted,
        "Contributor sync finished"
    );
    Ok(())
}
