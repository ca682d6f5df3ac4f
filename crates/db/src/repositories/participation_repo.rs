//! Repository for the `thamgia_<fragment>` tables.

use research_core::fragment::{FragmentId, TableKind};
use research_core::seed::SeedParticipation;
use sqlx::PgConnection;

use crate::models::participation::Participation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "manv AS employee_code, mada AS project_code, ngaythamgia AS joined_on, created_at";

/// Provides insert and read operations for project participations.
pub struct ParticipationRepo;

impl ParticipationRepo {
    /// Insert `input` unless the `(employee, project)` pair exists.
    ///
    /// Returns `true` if a row was inserted. The participation date takes
    /// the column default.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        input: &SeedParticipation,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (manv, mada)
             VALUES ($1, $2)
             ON CONFLICT (manv, mada) DO NOTHING",
            fragment.table(TableKind::Participation)
        );
        let result = sqlx::query(&query)
            .bind(&input.employee)
            .bind(&input.project)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all participations ordered by employee, then project.
    pub async fn list(
        conn: &mut PgConnection,
        fragment: &FragmentId,
    ) -> Result<Vec<Participation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY manv, mada",
            fragment.table(TableKind::Participation)
        );
        sqlx::query_as::<_, Participation>(&query)
            .fetch_all(&mut *conn)
            .await
    }
}
