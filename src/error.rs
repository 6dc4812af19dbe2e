//! Error types for the rollcall attendance backend.

use thiserror::Error;

/// Main error type for rollcall operations.
#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Domain errors raised by calendar operations.
///
/// These map one-to-one onto the failure kinds a calling layer needs to
/// distinguish: missing resources, creation collisions, and rejected input.
#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Calendar not found for {year}-{month}")]
    NotFound { year: String, month: String },

    #[error("Day {day} not found in calendar {year}-{month}")]
    DayNotFound { year: String, month: String, day: u32 },

    #[error("Calendar already exists for {year}-{month}")]
    Conflict { year: String, month: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rollcall operations.
pub type Result<T> = std::result::Result<T, RollcallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RollcallError::Calendar(CalendarError::NotFound {
            year: "2025".to_string(),
            month: "03".to_string(),
        });
        assert!(err.to_string().contains("2025-03"));
    }

    #[test]
    fn test_conflict_display() {
        let err = CalendarError::Conflict {
            year: "2025".to_string(),
            month: "01".to_string(),
        };
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RollcallError = io_err.into();
        assert!(matches!(err, RollcallError::Io(_)));
    }

    #[test]
    fn test_storage_conversion() {
        let err: RollcallError = StorageError::DuplicateKey("2025-01".to_string()).into();
        assert!(matches!(err, RollcallError::Storage(_)));
    }
}
