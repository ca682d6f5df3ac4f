//! Provisioning of the research fragment databases.
//!
//! [`orchestrator::initialize_databases`] walks the configured fragments
//! in order and, for each one, waits for the server, creates the
//! database if needed, creates the schema, loads the seed rows and
//! verifies the result.

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod verify;
