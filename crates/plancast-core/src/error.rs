//! Error types for the plan coordinator.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Comprehensive error type for all coordinator operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The plan's cancellation token fired while the operation was pending
    #[error("Plan '{plan_id}' was cancelled")]
    Cancelled { plan_id: String },
    /// A stream message could not be turned into its wire representation
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// A build handle that does not belong to this tracker
    #[error("Build #{index} for path '{path}' not found")]
    BuildNotFound { path: String, index: usize },
    /// A build record was mutated after it already resolved
    #[error("Build #{index} for path '{path}' already resolved as {outcome}")]
    BuildAlreadyResolved {
        path: String,
        index: usize,
        outcome: &'static str,
    },
    /// A second terminal `finished` message was emitted
    #[error("Plan '{plan_id}' already emitted its finished message")]
    AlreadyFinished { plan_id: String },
    /// The completion signal was written more than once
    #[error("Completion signal already delivered")]
    CompletionAlreadySignaled,
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlanError {
        PlanError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlanError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a cancellation error for the given plan.
    pub fn cancelled(plan_id: impl Into<String>) -> Self {
        Self::Cancelled {
            plan_id: plan_id.into(),
        }
    }

    /// Returns true for contract violations by a collaborator (double
    /// marking a build, a second finished message, a second completion
    /// write).
    pub fn is_usage_fault(&self) -> bool {
        matches!(
            self,
            Self::BuildAlreadyResolved { .. }
                | Self::AlreadyFinished { .. }
                | Self::CompletionAlreadySignaled
        )
    }

    /// Converts the error into the transport-neutral shape handed to
    /// HTTP-facing collaborators.
    pub fn to_api_error(&self) -> ApiError {
        let kind = match self {
            Self::Cancelled { .. } => ApiErrorKind::Cancelled,
            Self::Serialization { .. } => ApiErrorKind::StreamSerialization,
            Self::BuildNotFound { .. } => ApiErrorKind::NotFound,
            Self::BuildAlreadyResolved { .. }
            | Self::AlreadyFinished { .. }
            | Self::CompletionAlreadySignaled => ApiErrorKind::Conflict,
            Self::InvalidInput { .. } => ApiErrorKind::InvalidInput,
            Self::FileSystem { .. } | Self::Configuration { .. } => ApiErrorKind::Other,
        };
        ApiError::new(kind, self.to_string())
    }
}

/// Category of an [`ApiError`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ApiErrorKind {
    /// A stream message failed to serialize
    StreamSerialization,
    /// The broadcast loop faulted while delivering
    BroadcastFault,
    /// The plan was cancelled
    Cancelled,
    /// A referenced entity does not exist
    NotFound,
    /// The request conflicts with the plan's current state
    Conflict,
    /// The request was malformed
    InvalidInput,
    /// Anything else
    Other,
}

impl ApiErrorKind {
    /// HTTP status a transport layer should answer with for this kind.
    pub fn http_status_hint(&self) -> u16 {
        match self {
            ApiErrorKind::StreamSerialization
            | ApiErrorKind::BroadcastFault
            | ApiErrorKind::Other => 500,
            ApiErrorKind::Cancelled => 499,
            ApiErrorKind::NotFound => 404,
            ApiErrorKind::Conflict => 409,
            ApiErrorKind::InvalidInput => 400,
        }
    }
}

/// Terminal error delivered on the completion signal and embedded in
/// `error` stream messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub http_status_hint: u16,
    pub message: String,
}

impl ApiError {
    /// Creates an error with the default status hint for `kind`.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status_hint: kind.http_status_hint(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.message, self.kind)
    }
}

/// Extension trait for Result to provide concise error mapping with
/// anyhow-style context.
pub trait ResultExt<T, E> {
    /// Add context to any error type, converting to PlanError.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| PlanError::Configuration {
            message: format!("{}: {}", context, e),
        })
    }
}

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, PlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_wire_shape() {
        let error = ApiError::new(ApiErrorKind::StreamSerialization, "boom");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["kind"], "streamSerialization");
        assert_eq!(json["httpStatusHint"], 500);
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_usage_faults_map_to_conflict() {
        let error = PlanError::BuildAlreadyResolved {
            path: "src/main.rs".to_string(),
            index: 0,
            outcome: "success",
        };

        assert!(error.is_usage_fault());
        let api = error.to_api_error();
        assert_eq!(api.kind, ApiErrorKind::Conflict);
        assert_eq!(api.http_status_hint, 409);
        assert!(api.message.contains("src/main.rs"));
    }

    #[test]
    fn test_cancelled_is_not_a_usage_fault() {
        let error = PlanError::cancelled("p1");
        assert!(!error.is_usage_fault());
        assert_eq!(error.to_api_error().kind, ApiErrorKind::Cancelled);
    }

    #[test]
    fn test_invalid_input_builder() {
        let error = PlanError::invalid_input("subscriber_capacity").with_reason("must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid input for field 'subscriber_capacity': must be at least 1"
        );
    }
}
