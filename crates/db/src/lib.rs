//! PostgreSQL plumbing for provisioning research fragments.
//!
//! Every operation takes a single `&mut PgConnection`. Connections are
//! opened for one step and closed right after; there is no pool.

use sqlx::PgConnection;

pub mod bootstrap;
pub mod connection;
pub mod models;
pub mod probe;
pub mod repositories;
pub mod schema;
pub mod seed_loader;

pub use connection::{connect, ConnectionProfile};

/// Round-trip a trivial query to confirm the connection is usable.
pub async fn health_check(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(&mut *conn).await?;
    Ok(())
}
