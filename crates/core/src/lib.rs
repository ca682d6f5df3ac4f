//! Domain types shared by the research fragment provisioner.
//!
//! Nothing in this crate touches the database. Everything that ends up
//! in SQL text (fragment names, departments, database names) is parsed
//! and validated here first.

pub mod backoff;
pub mod error;
pub mod fragment;
pub mod integrity;
pub mod seed;
pub mod types;
