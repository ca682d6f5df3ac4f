//! Fragment-by-fragment database provisioning.
//!
//! Fragments are provisioned one at a time in configuration order. The
//! first failure stops the run; fragments after it are not touched.

use research_core::backoff::BackoffPolicy;
use research_core::fragment::{Department, FragmentId, FragmentMap};
use research_core::seed::SeedCatalog;
use research_core::types::TableCounts;
use research_db::bootstrap::ensure_database;
use research_db::probe::wait_for_server;
use research_db::schema::{create_fragment_schema, SchemaReport};
use research_db::seed_loader::{load_seed_data, SeedReport};
use research_db::{connect, ConnectionProfile};
use serde::Serialize;
use sqlx::{Connection, PgConnection};

use crate::config::{FragmentProfile, InitConfig};
use crate::error::{ProvisionError, Stage};
use crate::verify::verify_fragment;

/// What provisioning did to one fragment.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentSummary {
    pub fragment: FragmentId,
    pub department: Department,
    pub database: String,
    /// `true` if the database did not exist before this run.
    pub database_created: bool,
    pub schema: SchemaReport,
    pub seed: SeedReport,
    /// Row counts read back after seeding.
    pub rows: TableCounts,
}

/// Provision every fragment in `config` in order.
///
/// The fragment list and every fragment's seed set are checked before any
/// server is contacted, so a bad configuration fails without side effects.
pub async fn initialize_databases(
    config: &InitConfig,
    seeds: &SeedCatalog,
) -> Result<Vec<FragmentSummary>, ProvisionError> {
    // Rejects duplicate fragments or departments.
    let map = config.fragment_map()?;
    tracing::info!(fragments = map.len(), "Provisioning fragment databases");
    for department in unmatched_seed_departments(&map, seeds) {
        tracing::warn!(department, "Seed data has no fragment and will not be loaded");
    }

    for profile in &config.fragments {
        seeds
            .for_department(&profile.department)?
            .validate_for(&profile.department)?;
    }

    let mut summaries = Vec::with_capacity(config.fragments.len());
    for profile in &config.fragments {
        tracing::info!(
            fragment = %profile.fragment,
            database = %profile.database,
            server = %profile.admin.target(),
            "Initializing fragment",
        );

        match provision_fragment(profile, config, seeds).await {
            Ok(summary) => {
                tracing::info!(
                    fragment = %summary.fragment,
                    database_created = summary.database_created,
                    tables_created = summary.schema.created.len(),
                    rows_inserted = summary.seed.inserted.total(),
                    "Fragment initialized",
                );
                summaries.push(summary);
            }
            Err(e) => {
                tracing::error!(
                    fragment = %profile.fragment,
                    error = %e,
                    "Fragment initialization failed",
                );
                return Err(e);
            }
        }
    }

    tracing::info!(fragments = summaries.len(), "All fragment databases initialized");
    Ok(summaries)
}

/// Provision a single fragment.
///
/// Steps:
/// 1. Probe the administrative database until the server answers.
/// 2. Create the fragment database if it is missing. A freshly created
///    database gets the configured pause and is then probed itself.
/// 3. Connect to the fragment database.
/// 4. Create the schema and load the seed rows.
/// 5. Read the rows back and verify them.
///
/// Both connections are closed before returning, on success and on error.
pub async fn provision_fragment(
    profile: &FragmentProfile,
    config: &InitConfig,
    seeds: &SeedCatalog,
) -> Result<FragmentSummary, ProvisionError> {
    let fragment = &profile.fragment;

    // 1. Wait for the server.
    await_ready(fragment, &profile.admin, &config.probe).await?;

    // 2. Create the database if needed.
    let database_created = {
        let mut admin = open(fragment, &profile.admin, &config.probe).await?;
        let result = ensure_database(&mut admin, &profile.database).await;
        close(fragment, admin).await;
        result.map_err(|e| ProvisionError::database(fragment, Stage::CreateDatabase, e))?
    };
    if database_created {
        tokio::time::sleep(config.creation_pause).await;
        await_ready(fragment, &profile.target, &config.probe).await?;
    }

    // 3. Connect to the fragment database.
    let mut conn = open(fragment, &profile.target, &config.probe).await?;

    // 4-5. Populate and verify.
    let result = populate(&mut conn, profile, seeds).await;
    close(fragment, conn).await;
    let (schema, seed, rows) = result?;

    Ok(FragmentSummary {
        fragment: fragment.clone(),
        department: profile.department.clone(),
        database: profile.database.to_string(),
        database_created,
        schema,
        seed,
        rows,
    })
}

/// Departments in `seeds` that no configured fragment holds.
pub fn unmatched_seed_departments<'a>(
    map: &FragmentMap,
    seeds: &'a SeedCatalog,
) -> Vec<&'a str> {
    seeds
        .departments()
        .filter(|code| {
            Department::parse(code)
                .map(|department| !map.is_valid_department(&department))
                .unwrap_or(true)
        })
        .collect()
}

async fn populate(
    conn: &mut PgConnection,
    profile: &FragmentProfile,
    seeds: &SeedCatalog,
) -> Result<(SchemaReport, SeedReport, TableCounts), ProvisionError> {
    let fragment = &profile.fragment;
    let department = &profile.department;

    let schema = create_fragment_schema(conn, fragment, department)
        .await
        .map_err(|e| ProvisionError::database(fragment, Stage::Schema, e))?;

    let seed = load_seed_data(conn, fragment, department, seeds)
        .await
        .map_err(|e| ProvisionError::from_seed(fragment, e))?;

    let rows = verify_fragment(conn, fragment, department).await?;
    Ok((schema, seed, rows))
}

async fn await_ready(
    fragment: &FragmentId,
    profile: &ConnectionProfile,
    policy: &BackoffPolicy,
) -> Result<(), ProvisionError> {
    let readiness = wait_for_server(profile, policy).await;
    if readiness.is_ready() {
        Ok(())
    } else {
        Err(ProvisionError::NotReady {
            fragment: fragment.clone(),
            attempts: readiness.attempts(),
        })
    }
}

async fn open(
    fragment: &FragmentId,
    profile: &ConnectionProfile,
    policy: &BackoffPolicy,
) -> Result<PgConnection, ProvisionError> {
    connect(profile, policy.connect_timeout)
        .await
        .map_err(|e| ProvisionError::database(fragment, Stage::Connect, e))
}

/// Close `conn`, logging rather than returning a failure.
async fn close(fragment: &FragmentId, conn: PgConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(%fragment, error = %e, "Error closing connection");
    }
}
