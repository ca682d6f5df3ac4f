//! Research group entity model.

use research_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from `nhomnc_<fragment>`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub code: String,
    pub name: String,
    pub department: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
