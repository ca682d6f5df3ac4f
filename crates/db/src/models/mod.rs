//! Row structs for the per-fragment tables.
//!
//! Column names in the database are the Vietnamese research schema names
//! (`manhomnc`, `hoten`, ...); the repositories alias them to the field
//! names used here. Inserts take the seed structs from
//! `research_core::seed` directly.

pub mod employee;
pub mod group;
pub mod participation;
pub mod project;
