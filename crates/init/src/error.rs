use std::fmt;

use research_core::error::CoreError;
use research_core::fragment::FragmentId;
use research_core::integrity::Violation;
use research_db::seed_loader::SeedError;

/// Step of fragment provisioning that a database error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Opening the administrative or fragment connection.
    Connect,
    /// Checking for and creating the fragment database.
    CreateDatabase,
    /// Creating the fragment tables.
    Schema,
    /// Inserting seed rows.
    Seed,
    /// Reading rows back for verification.
    Verify,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Connect => "connect",
            Stage::CreateDatabase => "create database",
            Stage::Schema => "schema",
            Stage::Seed => "seed",
            Stage::Verify => "verify",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("Database server for fragment {fragment} not ready after {attempts} attempts")]
    NotReady { fragment: FragmentId, attempts: u32 },

    #[error("Fragment {fragment} failed at {stage}: {source}")]
    Database {
        fragment: FragmentId,
        stage: Stage,
        #[source]
        source: sqlx::Error,
    },

    #[error("Fragment {fragment} failed verification: {}", join(.violations))]
    Integrity {
        fragment: FragmentId,
        violations: Vec<Violation>,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ProvisionError {
    /// Wrap `source` as a failure of `fragment` at `stage`.
    pub fn database(fragment: &FragmentId, stage: Stage, source: sqlx::Error) -> Self {
        ProvisionError::Database {
            fragment: fragment.clone(),
            stage,
            source,
        }
    }

    pub fn from_seed(fragment: &FragmentId, err: SeedError) -> Self {
        match err {
            SeedError::Seed(core) => ProvisionError::Core(core),
            SeedError::Database(source) => Self::database(fragment, Stage::Seed, source),
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
