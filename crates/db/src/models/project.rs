//! Project entity model.

use research_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `dean_<fragment>`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub code: String,
    pub name: String,
    /// Owning research group.
    pub group_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
