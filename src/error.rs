//! # Document Errors
//!
//! This module defines the error taxonomy shared by the registry, the serializer,
//! the inclusion resolver and the collection filter. Every failure aborts the
//! in-flight document; none of them is retried by the engine.
//!
//! Errors fall into three outward classes (see [`ErrorClass`]) so that the transport
//! layer can tell bad client input apart from a misconfigured deployment.

use crate::repository::RepositoryError;
use serde::Serialize;

/// Convenience alias used throughout the crate.
pub type Result<T, E = DocumentError> = std::result::Result<T, E>;

/// Errors raised while building or rendering documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A domain object or wire-type name has no registered descriptor.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// A registered field could not be read off an object.
    #[error("Cannot access field `{field}` of `{wire_type}`: {reason}")]
    FieldAccess {
        wire_type: String,
        field: String,
        reason: String,
    },

    /// A wire-type name or domain type was registered twice.
    #[error("Resource type already registered: {0}")]
    DuplicateType(String),

    /// A descriptor handed to the registry is malformed.
    #[error("Invalid descriptor for `{wire_type}`: {reason}")]
    InvalidDescriptor { wire_type: String, reason: String },

    /// An inclusion request names a relationship the wire type does not declare.
    #[error("Unknown relationship `{relationship}` on `{wire_type}`")]
    UnknownRelationship {
        wire_type: String,
        relationship: String,
    },

    /// The repository collaborator failed while fetching resources.
    #[error("Repository for `{wire_type}` failed: {source}")]
    Repository {
        wire_type: String,
        #[source]
        source: RepositoryError,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocumentError {
    pub fn field_access(
        wire_type: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DocumentError::FieldAccess {
            wire_type: wire_type.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn repository(wire_type: impl Into<String>, source: RepositoryError) -> Self {
        DocumentError::Repository {
            wire_type: wire_type.into(),
            source,
        }
    }

    /// Outward class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            DocumentError::UnknownResource(_) => ErrorClass::NotFound,
            DocumentError::UnknownRelationship { .. } => ErrorClass::BadRequest,
            DocumentError::Repository { source, .. } => match source {
                RepositoryError::NotFound(_) => ErrorClass::NotFound,
                _ => ErrorClass::Internal,
            },
            DocumentError::FieldAccess { .. }
            | DocumentError::DuplicateType(_)
            | DocumentError::InvalidDescriptor { .. }
            | DocumentError::Serialization(_) => ErrorClass::Internal,
        }
    }

    /// The engine never retries, and callers should not either.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Outward failure class used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    BadRequest,
    Internal,
}

impl ErrorClass {
    pub fn status(self) -> u16 {
        match self {
            ErrorClass::NotFound => 404,
            ErrorClass::BadRequest => 400,
            ErrorClass::Internal => 500,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ErrorClass::NotFound => "Not Found",
            ErrorClass::BadRequest => "Bad Request",
            ErrorClass::Internal => "Internal Server Error",
        }
    }
}

/// A single entry of the wire `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
}

/// Top-level error document handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    pub fn from_error(error: &DocumentError) -> Self {
        let class = error.class();
        Self {
            errors: vec![ErrorObject {
                status: class.status().to_string(),
                title: class.title().to_string(),
                detail: error.to_string(),
            }],
        }
    }

    /// Status of the first error, which is the only one the engine emits.
    pub fn status(&self) -> u16 {
        self.errors
            .first()
            .and_then(|e| e.status.parse().ok())
            .unwrap_or(500)
    }
}
