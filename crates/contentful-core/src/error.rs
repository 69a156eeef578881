use std::fmt;

use thiserror::Error;

/// Publish/archive transition that can fail part-way through a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStep {
    Publish,
    Unpublish,
    Archive,
    Unarchive,
    Activate,
    Deactivate,
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publish => write!(f, "publish"),
            Self::Unpublish => write!(f, "unpublish"),
            Self::Archive => write!(f, "archive"),
            Self::Unarchive => write!(f, "unarchive"),
            Self::Activate => write!(f, "activate"),
            Self::Deactivate => write!(f, "deactivate"),
        }
    }
}

/// Errors raised while reconciling a resource against the Content Management API.
#[derive(Debug, Error)]
pub enum ContentfulError {
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    #[error(
        "Version conflict on {resource_type}/{id}: version {version} is stale, refresh state before retrying"
    )]
    Conflict {
        resource_type: String,
        id: String,
        version: u64,
    },

    #[error("Unexpected status for {operation}: expected {}, got {actual}: {body}", format_expected(.expected))]
    UnexpectedStatus {
        operation: String,
        expected: Vec<u16>,
        actual: u16,
        body: String,
    },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Malformed import id \"{id}\" for {resource_type}: {reason}; expected format {format}")]
    MalformedImportId {
        resource_type: String,
        id: String,
        format: String,
        reason: String,
    },

    #[error("{step} step failed, earlier remote changes were kept: {source}")]
    Lifecycle {
        step: LifecycleStep,
        #[source]
        source: Box<ContentfulError>,
    },

    #[error("Processing of {resource_type}/{id} did not finish after {attempts} attempts")]
    ProcessingTimeout {
        resource_type: String,
        id: String,
        attempts: u32,
    },

    #[error("Processing of {resource_type}/{id} failed: {reason}")]
    ProcessingFailed {
        resource_type: String,
        id: String,
        reason: String,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

fn format_expected(expected: &[u16]) -> String {
    expected
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}

impl ContentfulError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn conflict(resource_type: impl Into<String>, id: impl Into<String>, version: u64) -> Self {
        Self::Conflict {
            resource_type: resource_type.into(),
            id: id.into(),
            version,
        }
    }

    pub fn unexpected_status(
        operation: impl Into<String>,
        expected: &[u16],
        actual: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::UnexpectedStatus {
            operation: operation.into(),
            expected: expected.to_vec(),
            actual,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn lifecycle(step: LifecycleStep, source: ContentfulError) -> Self {
        Self::Lifecycle {
            step,
            source: Box::new(source),
        }
    }

    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for a stale-version rejection, also when wrapped by a lifecycle step.
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Conflict { .. } => true,
            Self::Lifecycle { source, .. } => source.is_conflict(),
            _ => false,
        }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::UnexpectedStatus { .. } => ErrorCategory::Remote,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::MalformedImportId { .. } | Self::InvalidValue { .. } => ErrorCategory::Validation,
            Self::Lifecycle { source, .. } => source.category(),
            Self::ProcessingTimeout { .. } | Self::ProcessingFailed { .. } => {
                ErrorCategory::Processing
            }
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Conflict,
    Remote,
    Transport,
    Processing,
    Serialization,
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Remote => write!(f, "remote"),
            Self::Transport => write!(f, "transport"),
            Self::Processing => write!(f, "processing"),
            Self::Serialization => write!(f, "serialization"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for reconciler operations
pub type Result<T> = std::result::Result<T, ContentfulError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let err = ContentfulError::not_found("contentful_entry", "hello");
        assert_eq!(err.to_string(), "Resource not found: contentful_entry/hello");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_conflict_error() {
        let err = ContentfulError::conflict("contentful_role", "r1", 4);
        assert!(err.is_conflict());
        assert!(err.to_string().contains("version 4 is stale"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_unexpected_status_names_both_codes() {
        let err = ContentfulError::unexpected_status("create locale", &[201], 422, "bad code");
        let msg = err.to_string();
        assert!(msg.contains("expected 201"));
        assert!(msg.contains("got 422"));
        assert!(msg.contains("bad code"));

        let err = ContentfulError::unexpected_status("delete", &[204, 200], 500, "");
        assert!(err.to_string().contains("expected 204 or 200"));
    }

    #[test]
    fn test_lifecycle_error_keeps_source() {
        let inner = ContentfulError::conflict("contentful_entry", "e1", 2);
        let err = ContentfulError::lifecycle(LifecycleStep::Archive, inner);
        assert!(err.to_string().starts_with("archive step failed"));
        assert!(err.is_conflict());
        assert_eq!(err.category(), ErrorCategory::Conflict);

        let source = std::error::Error::source(&err).expect("source");
        assert!(source.to_string().contains("e1"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: ContentfulError = json_err.into();
        assert!(matches!(err, ContentfulError::Serialization(_)));
        assert_eq!(err.category(), ErrorCategory::Serialization);
    }

    #[test]
    fn test_error_categories_display() {
        assert_eq!(ErrorCategory::Validation.to_string(), "validation");
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
        assert_eq!(ErrorCategory::Conflict.to_string(), "conflict");
        assert_eq!(ErrorCategory::Transport.to_string(), "transport");
        assert_eq!(ErrorCategory::Processing.to_string(), "processing");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(LifecycleStep::Unpublish.to_string(), "unpublish");
        assert_eq!(LifecycleStep::Deactivate.to_string(), "deactivate");
    }
}
