//! Conditional DDL for the four tables of a fragment.
//!
//! Each table is created only when the catalog does not list it yet, so
//! provisioning an already provisioned fragment changes nothing. Table,
//! constraint and index names carry the fragment suffix; the department
//! is pinned by a check constraint on the group table.

use research_core::fragment::{Department, FragmentId, TableKind};
use serde::Serialize;
use sqlx::{Executor, PgConnection};

/// Outcome of [`create_fragment_schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// Tables created by this call.
    pub created: Vec<String>,
    /// Tables that were already present.
    pub existing: Vec<String>,
}

impl SchemaReport {
    /// `true` when nothing had to be created.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

/// Whether `table` exists in the connection's current schema.
pub async fn table_exists(conn: &mut PgConnection, table: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
            SELECT 1
            FROM information_schema.tables
            WHERE table_schema = current_schema()
              AND table_name = $1
        )",
    )
    .bind(table)
    .fetch_one(&mut *conn)
    .await
}

/// `CREATE TABLE` statement for `kind` in `fragment`.
pub fn table_ddl(kind: TableKind, fragment: &FragmentId, department: &Department) -> String {
    let table = fragment.table(kind);
    let groups = fragment.table(TableKind::Group);
    let employees = fragment.table(TableKind::Employee);
    let projects = fragment.table(TableKind::Project);

    match kind {
        TableKind::Group => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                manhomnc   TEXT NOT NULL,
                tennhomnc  TEXT NOT NULL,
                tenphong   TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT pk_{table} PRIMARY KEY (manhomnc),
                CONSTRAINT ck_{table}_tenphong CHECK (tenphong = {department})
            )",
            department = department.sql_literal(),
        ),
        TableKind::Employee => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                manv       TEXT NOT NULL,
                hoten      TEXT NOT NULL,
                manhomnc   TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT pk_{table} PRIMARY KEY (manv),
                CONSTRAINT fk_{table}_nhomnc FOREIGN KEY (manhomnc)
                    REFERENCES {groups} (manhomnc) ON DELETE RESTRICT ON UPDATE CASCADE
            )"
        ),
        TableKind::Project => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                mada       TEXT NOT NULL,
                tenda      TEXT NOT NULL,
                manhomnc   TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT pk_{table} PRIMARY KEY (mada),
                CONSTRAINT fk_{table}_nhomnc FOREIGN KEY (manhomnc)
                    REFERENCES {groups} (manhomnc) ON DELETE RESTRICT ON UPDATE CASCADE
            )"
        ),
        TableKind::Participation => format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                manv        TEXT NOT NULL,
                mada        TEXT NOT NULL,
                ngaythamgia DATE NOT NULL DEFAULT CURRENT_DATE,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT pk_{table} PRIMARY KEY (manv, mada),
                CONSTRAINT fk_{table}_nhanvien FOREIGN KEY (manv)
                    REFERENCES {employees} (manv) ON DELETE RESTRICT ON UPDATE CASCADE,
                CONSTRAINT fk_{table}_dean FOREIGN KEY (mada)
                    REFERENCES {projects} (mada) ON DELETE RESTRICT ON UPDATE CASCADE
            )"
        ),
    }
}

/// Indexes on foreign-key columns that do not lead a primary key.
pub fn index_ddl(kind: TableKind, fragment: &FragmentId) -> Vec<String> {
    let table = fragment.table(kind);
    let column = match kind {
        TableKind::Group => return Vec::new(),
        TableKind::Employee | TableKind::Project => "manhomnc",
        // `manv` is covered by the composite primary key.
        TableKind::Participation => "mada",
    };
    vec![format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table} ({column})"
    )]
}

/// Create the group, employee, project and participation tables of
/// `fragment` if they are missing.
///
/// Errors are logged and returned as-is; tables created before the failure
/// are left in place.
pub async fn create_fragment_schema(
    conn: &mut PgConnection,
    fragment: &FragmentId,
    department: &Department,
) -> Result<SchemaReport, sqlx::Error> {
    let mut report = SchemaReport::default();

    for kind in TableKind::ALL {
        let table = fragment.table(kind);
        match ensure_table(conn, kind, fragment, department).await {
            Ok(true) => {
                tracing::debug!(%fragment, table = table.as_str(), "Created table");
                report.created.push(table);
            }
            Ok(false) => {
                tracing::debug!(%fragment, table = table.as_str(), "Table already exists");
                report.existing.push(table);
            }
            Err(e) => {
                tracing::error!(
                    %fragment,
                    table = table.as_str(),
                    error = %e,
                    "Error creating schema",
                );
                return Err(e);
            }
        }
    }

    tracing::info!(
        %fragment,
        created = report.created.len(),
        existing = report.existing.len(),
        "Schema ready",
    );
    Ok(report)
}

async fn ensure_table(
    conn: &mut PgConnection,
    kind: TableKind,
    fragment: &FragmentId,
    department: &Department,
) -> Result<bool, sqlx::Error> {
    let created = if table_exists(conn, &fragment.table(kind)).await? {
        false
    } else {
        let ddl = table_ddl(kind, fragment, department);
        conn.execute(ddl.as_str()).await?;
        true
    };

    for ddl in index_ddl(kind, fragment) {
        conn.execute(ddl.as_str()).await?;
    }
    Ok(created)
}
