#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No seed data defined for department {0}")]
    UnknownDepartment(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid seed document: {0}")]
    Seed(#[from] serde_json::Error),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
