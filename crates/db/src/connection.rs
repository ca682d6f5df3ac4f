//! Connection descriptors for administrative and fragment databases.

use std::fmt;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection};

/// Everything needed to open one connection to one database.
#[derive(Clone)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Accept the server's certificate without verifying it.
    ///
    /// `true` negotiates TLS when offered but never checks the chain;
    /// `false` requires TLS with full certificate and hostname checks.
    pub trust_server_certificate: bool,
}

impl ConnectionProfile {
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.trust_server_certificate {
            PgSslMode::Prefer
        } else {
            PgSslMode::VerifyFull
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    /// Same server and credentials, different database.
    pub fn with_database(&self, database: &str) -> Self {
        Self {
            database: database.to_string(),
            ..self.clone()
        }
    }

    /// `host:port/database`, safe to log.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("trust_server_certificate", &self.trust_server_certificate)
            .finish()
    }
}

/// Open a connection, giving up after `timeout`.
///
/// Statements on the returned connection run outside any explicit
/// transaction, so each one commits on its own.
pub async fn connect(
    profile: &ConnectionProfile,
    timeout: Duration,
) -> Result<PgConnection, sqlx::Error> {
    let options = profile.connect_options();
    match tokio::time::timeout(timeout, PgConnection::connect_with(&options)).await {
        Ok(result) => result,
        Err(_) => Err(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!(
                "connection to {} timed out after {}s",
                profile.target(),
                timeout.as_secs_f64()
            ),
        ))),
    }
}
