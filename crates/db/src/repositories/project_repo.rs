//! Repository for the `dean_<fragment>` tables.

use research_core::fragment::{FragmentId, TableKind};
use research_core::seed::SeedProject;
use sqlx::PgConnection;

use crate::models::project::Project;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "mada AS code, tenda AS name, manhomnc AS group_code, created_at, updated_at";

/// Provides insert and read operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert `input` unless a project with the same code exists.
    ///
    /// Returns `true` if a row was inserted.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        input: &SeedProject,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (mada, tenda, manhomnc)
             VALUES ($1, $2, $3)
             ON CONFLICT (mada) DO NOTHING",
            fragment.table(TableKind::Project)
        );
        let result = sqlx::query(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.group)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all projects ordered by code.
    pub async fn list(
        conn: &mut PgConnection,
        fragment: &FragmentId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY mada",
            fragment.table(TableKind::Project)
        );
        sqlx::query_as::<_, Project>(&query)
            .fetch_all(&mut *conn)
            .await
    }
}
