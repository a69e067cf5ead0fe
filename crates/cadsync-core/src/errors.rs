use cadsync_core_types::RunId;
use thiserror::Error;

/// Result type alias using CadSyncError
pub type Result<T> = std::result::Result<T, CadSyncError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, exit-code mapping in the CLI, and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Snapshot loading
    /// The designated key column is not declared by the source, or a row lacks it
    MissingKeyColumn,
    /// Two rows of one source share a key value
    DuplicateKey,
    /// A key value is null, fractional, or of a non-key type
    InvalidKey,
    /// A geometry carries non-finite coordinates or no vertices
    InvalidGeometry,
    /// An attribute value cannot be exported faithfully (NaN, infinity)
    InvalidValue,
    /// A snapshot document is structurally malformed
    InvalidSnapshot,

    // Configuration
    InvalidConfig,
    NotFound,

    // Integration/IO
    Io,
    Serialization,
    Export,
    Notification,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MissingKeyColumn => "ERR_MISSING_KEY_COLUMN",
            ExErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ExErrorKind::InvalidKey => "ERR_INVALID_KEY",
            ExErrorKind::InvalidGeometry => "ERR_INVALID_GEOMETRY",
            ExErrorKind::InvalidValue => "ERR_INVALID_VALUE",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Export => "ERR_EXPORT",
            ExErrorKind::Notification => "ERR_NOTIFICATION",
        }
    }

    /// True for the kinds that classify malformed snapshot input
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::MissingKeyColumn
                | ExErrorKind::DuplicateKey
                | ExErrorKind::InvalidKey
                | ExErrorKind::InvalidGeometry
                | ExErrorKind::InvalidValue
                | ExErrorKind::InvalidSnapshot
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus context for
/// debugging: the failing operation, the entity involved (source name or
/// record key) and run correlation.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (source name, record key, file path)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for snapshot loading
///
/// These are the only failures of the change-detection core: the differs and
/// the aggregator are total over well-formed record sets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CadSyncError {
    /// Key column not declared by the source
    #[error("Key column '{key_column}' not found in source '{source_name}'")]
    MissingKeyColumn {
        source_name: String,
        key_column: String,
    },

    /// A row has no value (or null) in the key column
    #[error("Row {row_index} of source '{source_name}' has no value in key column '{key_column}'")]
    MissingKeyValue {
        source_name: String,
        key_column: String,
        row_index: usize,
    },

    /// Key value appears more than once
    #[error("Duplicate key {key} in source '{source_name}'")]
    DuplicateKey { source_name: String, key: String },

    /// Key value has an unusable type
    #[error("Invalid key in row {row_index} of source '{source_name}': {reason}")]
    InvalidKey {
        source_name: String,
        row_index: usize,
        reason: String,
    },

    /// Geometry cannot take part in tolerance comparison
    #[error("Invalid geometry for key {key} in source '{source_name}': {reason}")]
    InvalidGeometry {
        source_name: String,
        key: String,
        reason: String,
    },

    /// Attribute value that the snapshot export cannot represent
    #[error("Invalid value in column '{column}' for key {key} in source '{source_name}': {reason}")]
    InvalidValue {
        source_name: String,
        key: String,
        column: String,
        reason: String,
    },

    /// Failure reading rows from the underlying source
    #[error("Failed to read source '{source_name}': {message}")]
    SourceRead {
        source_name: String,
        message: String,
    },
}

/// Conversion from CadSyncError to ExError
impl From<CadSyncError> for ExError {
    fn from(err: CadSyncError) -> Self {
        let message = err.to_string();
        match err {
            CadSyncError::MissingKeyColumn { source_name, .. }
            | CadSyncError::MissingKeyValue { source_name, .. } => {
                ExError::new(ExErrorKind::MissingKeyColumn)
                    .with_op("load")
                    .with_entity_id(source_name)
                    .with_message(message)
            }
            CadSyncError::DuplicateKey { key, .. } => ExError::new(ExErrorKind::DuplicateKey)
                .with_op("load")
                .with_entity_id(key)
                .with_message(message),
            CadSyncError::InvalidKey { source_name, .. } => ExError::new(ExErrorKind::InvalidKey)
                .with_op("load")
                .with_entity_id(source_name)
                .with_message(message),
            CadSyncError::InvalidGeometry { key, .. } => {
                ExError::new(ExErrorKind::InvalidGeometry)
                    .with_op("load")
                    .with_entity_id(key)
                    .with_message(message)
            }
            CadSyncError::InvalidValue { key, .. } => ExError::new(ExErrorKind::InvalidValue)
                .with_op("load")
                .with_entity_id(key)
                .with_message(message),
            CadSyncError::SourceRead { source_name, .. } => ExError::new(ExErrorKind::Io)
                .with_op("load")
                .with_entity_id(source_name)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_kind_codes() {
        let cases = [
            (ExErrorKind::MissingKeyColumn, "ERR_MISSING_KEY_COLUMN"),
            (ExErrorKind::DuplicateKey, "ERR_DUPLICATE_KEY"),
            (ExErrorKind::InvalidKey, "ERR_INVALID_KEY"),
            (ExErrorKind::InvalidGeometry, "ERR_INVALID_GEOMETRY"),
            (ExErrorKind::InvalidValue, "ERR_INVALID_VALUE"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
            assert!(kind.is_load_error());
        }
        assert!(!ExErrorKind::Io.is_load_error());
    }

    #[test]
    fn test_invalid_value_maps_to_record_key() {
        let err: ExError = CadSyncError::InvalidValue {
            source_name: "gis_nafot".to_string(),
            key: "7".to_string(),
            column: "area".to_string(),
            reason: "inf is not finite".to_string(),
        }
        .into();
        assert_eq!(err.code(), "ERR_INVALID_VALUE");
        assert_eq!(err.entity_id(), Some("7"));
        assert!(err.message().contains("'area'"));
    }

    #[test]
    fn test_display_includes_op_and_entity() {
        let err = ExError::new(ExErrorKind::DuplicateKey)
            .with_op("load")
            .with_entity_id("42")
            .with_message("Duplicate key 42");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_DUPLICATE_KEY]"));
        assert!(rendered.contains("'load'"));
        assert!(rendered.contains("(entity_id: 42)"));
    }

    #[test]
    fn test_source_chain_exposed_via_std_error() {
        use std::error::Error as _;
        let inner = ExError::new(ExErrorKind::Io).with_message("disk full");
        let outer = ExError::new(ExErrorKind::Export).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Io)
        );
    }
}
