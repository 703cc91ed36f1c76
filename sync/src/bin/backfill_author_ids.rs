//! Author-ID backfill job
//!
//! Fills the missing `author_id` of pull requests and issues from GitHub.
//! Rows that fail are logged and counted but do not fail the run.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sea_orm::Database;

use contrib_sync::adapters::{
    GitHubClientImpl, PostgresContributorRepository, PostgresItemRepository,
    PostgresRepositoryRepository, TableNames,
};
use contrib_sync::app::AuthorBackfillService;
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
            tracing::error!(error = ?e, "Author backfill failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let tables = TableNames::select(config.use_replica_tables);
    let settings = config.backfill_settings();
    tracing::info!(
        pull_requests = %tables.pull_requests,
        issues = %tables.issues,
        contributors = %tables.contributors,
        batch_size = settings.batch_size,
        pagination = ?settings.pagination,
        "Starting author backfill"
    );

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let items = Arc::new(PostgresItemRepository::new(db.clone(), tables.clone()));
    let repositories = Arc::new(PostgresRepositoryRepository::new(db.clone(), tables.clone()));
    let contributors = Arc::new(PostgresContributorRepository::new(db, tables));
    let github = Arc::new(
        GitHubClientImpl::new(config.github_api_url, config.github_token)
            .context("Failed to build GitHub client")?,
    );

    let service = AuthorBackfillService::new(items, repositories, contributors, github, settings);
    let report = service.run().await?;

    let summary = serde_json::to_string(&report).context("Failed to encode report")?;
    tracing::info!(report = %summary, "Author backfill finished");
    Ok(())
}
