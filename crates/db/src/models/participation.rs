//! Employee-on-project participation model.

use research_core::types::{Date, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `thamgia_<fragment>`. Keyed by `(employee_code, project_code)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participation {
    pub employee_code: String,
    pub project_code: String,
    /// Defaults to the insertion date.
    pub joined_on: Date,
    pub created_at: Timestamp,
}
