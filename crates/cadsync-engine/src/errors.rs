//! Error helpers for cadsync-engine
//!
//! Wraps cadsync-core ExError with engine-specific constructors

use cadsync_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error for a file-system operation on `path`
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        ExErrorKind::NotFound
    } else {
        ExErrorKind::Io
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_entity_id(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a configuration error
pub fn invalid_config(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("validate_config")
        .with_message(reason)
}

/// Create a malformed snapshot document error
pub fn invalid_snapshot(path: &Path, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::InvalidSnapshot)
        .with_op("read_snapshot")
        .with_entity_id(path.display().to_string())
        .with_message(format!("snapshot document is not valid: {}", err))
}

/// Create an error for a value the snapshot format cannot carry
pub fn invalid_value(operation: &str, entity: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidValue)
        .with_op(operation.to_string())
        .with_entity_id(entity.to_string())
        .with_message(reason)
}

/// Create a serialization error
pub fn serialization(operation: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Wrap a failure to write the export at `target`
pub fn export_error(target: &Path, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::Export)
        .with_op("export")
        .with_entity_id(target.display().to_string())
        .with_message(format!("failed to write export: {}", cause.message()))
        .with_source(cause)
}

/// Create a notification delivery error
pub fn notification_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Notification)
        .with_op("notify")
        .with_message(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = io_error(
            "read_snapshot",
            Path::new("/nope/mahoz.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entity_id(), Some("/nope/mahoz.json"));
    }

    #[test]
    fn test_other_io_failures_map_to_io() {
        let err = io_error(
            "export",
            Path::new("/out"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code(), "ERR_IO");
    }
}
