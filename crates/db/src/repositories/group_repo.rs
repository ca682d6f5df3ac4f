//! Repository for the `nhomnc_<fragment>` tables.

use research_core::fragment::{FragmentId, TableKind};
use research_core::seed::SeedGroup;
use sqlx::PgConnection;

use crate::models::group::Group;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "manhomnc AS code, tennhomnc AS name, tenphong AS department, \
                       created_at, updated_at";

/// Provides insert and read operations for research groups.
pub struct GroupRepo;

impl GroupRepo {
    /// Insert `input` unless a group with the same code exists.
    ///
    /// Returns `true` if a row was inserted.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        input: &SeedGroup,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (manhomnc, tennhomnc, tenphong)
             VALUES ($1, $2, $3)
             ON CONFLICT (manhomnc) DO NOTHING",
            fragment.table(TableKind::Group)
        );
        let result = sqlx::query(&query)
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.department)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a group by its code.
    pub async fn find_by_code(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        code: &str,
    ) -> Result<Option<Group>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE manhomnc = $1",
            fragment.table(TableKind::Group)
        );
        sqlx::query_as::<_, Group>(&query)
            .bind(code)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List all groups ordered by code.
    pub async fn list(
        conn: &mut PgConnection,
        fragment: &FragmentId,
    ) -> Result<Vec<Group>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY manhomnc",
            fragment.table(TableKind::Group)
        );
        sqlx::query_as::<_, Group>(&query)
            .fetch_all(&mut *conn)
            .await
    }
}
