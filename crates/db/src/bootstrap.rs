//! Fragment database creation, run against the administrative database.

use research_core::fragment::DatabaseName;
use sqlx::{Executor, PgConnection};

/// Whether a database called `name` exists on the server.
pub async fn database_exists(
    conn: &mut PgConnection,
    name: &DatabaseName,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(name.as_str())
        .fetch_one(&mut *conn)
        .await
}

/// Issue `CREATE DATABASE`. Fails if the database already exists.
pub async fn create_database(
    conn: &mut PgConnection,
    name: &DatabaseName,
) -> Result<(), sqlx::Error> {
    // Simple query protocol; one-off DDL is not worth preparing.
    let sql = format!("CREATE DATABASE {}", name.quoted());
    conn.execute(sql.as_str()).await?;
    Ok(())
}

/// Create `name` unless it already exists. Returns `true` if it was created.
pub async fn ensure_database(
    conn: &mut PgConnection,
    name: &DatabaseName,
) -> Result<bool, sqlx::Error> {
    if database_exists(conn, name).await? {
        tracing::info!(database = %name, "Database already exists");
        return Ok(false);
    }

    tracing::info!(database = %name, "Creating database");
    create_database(conn, name).await?;
    tracing::info!(database = %name, "Database created");
    Ok(true)
}
