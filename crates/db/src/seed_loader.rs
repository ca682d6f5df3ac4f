//! Idempotent loading of seed rows into a fragment.
//!
//! Rows go in table order (groups, employees, projects, participations)
//! so every foreign key points at a row that is already present. A row
//! whose key exists is skipped, which makes re-running the loader safe.

use research_core::error::CoreError;
use research_core::fragment::{Department, FragmentId};
use research_core::seed::{SeedCatalog, SeedSet};
use research_core::types::TableCounts;
use serde::Serialize;
use sqlx::PgConnection;

use crate::repositories::{EmployeeRepo, GroupRepo, ParticipationRepo, ProjectRepo};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Seed(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Rows inserted and rows skipped because their key already existed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: TableCounts,
    pub skipped: TableCounts,
}

/// Look up the seed set for `department`, validate it, and insert it.
pub async fn load_seed_data(
    conn: &mut PgConnection,
    fragment: &FragmentId,
    department: &Department,
    catalog: &SeedCatalog,
) -> Result<SeedReport, SeedError> {
    let set = catalog.for_department(department)?;
    set.validate_for(department)?;

    match insert_seed_set(conn, fragment, set).await {
        Ok(report) => {
            tracing::info!(
                %fragment,
                %department,
                inserted = report.inserted.total(),
                skipped = report.skipped.total(),
                "Inserted sample data",
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(%fragment, error = %e, "Error inserting sample data");
            Err(e.into())
        }
    }
}

/// Insert every row of `set` whose key is not present yet.
pub async fn insert_seed_set(
    conn: &mut PgConnection,
    fragment: &FragmentId,
    set: &SeedSet,
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    for group in &set.groups {
        let inserted = GroupRepo::insert_if_absent(conn, fragment, group).await?;
        tally(&mut report, inserted, |c| &mut c.groups);
    }
    for employee in &set.employees {
        let inserted = EmployeeRepo::insert_if_absent(conn, fragment, employee).await?;
        tally(&mut report, inserted, |c| &mut c.employees);
    }
    for project in &set.projects {
        let inserted = ProjectRepo::insert_if_absent(conn, fragment, project).await?;
        tally(&mut report, inserted, |c| &mut c.projects);
    }
    for participation in &set.participations {
        let inserted = ParticipationRepo::insert_if_absent(conn, fragment, participation).await?;
        tally(&mut report, inserted, |c| &mut c.participations);
    }

    Ok(report)
}

fn tally(report: &mut SeedReport, inserted: bool, field: fn(&mut TableCounts) -> &mut usize) {
    let counts = if inserted {
        &mut report.inserted
    } else {
        &mut report.skipped
    };
    *field(counts) += 1;
}
