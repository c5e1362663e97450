use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// An enumerated field carried a value outside its closed set.
    #[error("data integrity error: unknown {field} value '{value}'")]
    DataIntegrity { field: &'static str, value: String },
    #[error("invalid status: '{0}' has no overall status label")]
    InvalidStatus(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StatusError {
    pub(crate) fn integrity(field: &'static str, value: &str) -> Self {
        StatusError::DataIntegrity {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatusError>;
