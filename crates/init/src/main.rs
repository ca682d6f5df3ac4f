//! `research-init` -- provisions the research fragment databases.
//!
//! Waits for each fragment's server, creates the fragment database and
//! tables when missing, loads the seed rows and verifies them. Safe to run
//! repeatedly. See [`InitConfig::from_env`] for the environment variables.

use anyhow::Context;

use research_init::config::InitConfig;
use research_init::logging;
use research_init::orchestrator::initialize_databases;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_tracing();

    let config = InitConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        fragments = config.fragments.len(),
        max_attempts = config.probe.max_attempts,
        "Loaded configuration"
    );

    let seeds = config
        .load_seed_catalog()
        .context("Failed to load seed data")?;

    let summaries = initialize_databases(&config, &seeds).await?;
    for summary in &summaries {
        tracing::info!(
            fragment = %summary.fragment,
            database = summary.database.as_str(),
            groups = summary.rows.groups,
            employees = summary.rows.employees,
            projects = summary.rows.projects,
            participations = summary.rows.participations,
            "Fragment summary"
        );
    }

    Ok(())
}
