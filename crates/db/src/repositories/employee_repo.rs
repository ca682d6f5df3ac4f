//! Repository for the `nhanvien_<fragment>` tables.

use research_core::fragment::{FragmentId, TableKind};
use research_core::seed::SeedEmployee;
use sqlx::PgConnection;

use crate::models::employee::Employee;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "manv AS code, hoten AS full_name, manhomnc AS group_code, created_at, updated_at";

/// Provides insert and read operations for employees.
pub struct EmployeeRepo;

impl EmployeeRepo {
    /// Insert `input` unless an employee with the same code exists.
    ///
    /// Returns `true` if a row was inserted. The owning group must already
    /// exist in the same fragment.
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        input: &SeedEmployee,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (manv, hoten, manhomnc)
             VALUES ($1, $2, $3)
             ON CONFLICT (manv) DO NOTHING",
            fragment.table(TableKind::Employee)
        );
        let result = sqlx::query(&query)
            .bind(&input.code)
            .bind(&input.full_name)
            .bind(&input.group)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all employees ordered by code.
    pub async fn list(
        conn: &mut PgConnection,
        fragment: &FragmentId,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY manv",
            fragment.table(TableKind::Employee)
        );
        sqlx::query_as::<_, Employee>(&query)
            .fetch_all(&mut *conn)
            .await
    }

    /// List the employees of one group.
    pub async fn list_by_group(
        conn: &mut PgConnection,
        fragment: &FragmentId,
        group_code: &str,
    ) -> Result<Vec<Employee>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE manhomnc = $1 ORDER BY manv",
            fragment.table(TableKind::Employee)
        );
        sqlx::query_as::<_, Employee>(&query)
            .bind(group_code)
            .fetch_all(&mut *conn)
            .await
    }
}
