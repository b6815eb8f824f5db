//! Error types for mediator-core.
//!
//! The dispatch core itself only ever produces [`MediatorError::NoHandlerFound`]
//! and [`MediatorError::AmbiguousHandlerFound`]. Every other variant is raised
//! by handlers or behaviors and reaches the caller unchanged.

use std::fmt;

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Boxed error carried by [`MediatorError::Unhandled`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for all dispatch operations.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// No handler is bound to the request/response pair.
    #[error("No handler registered for {request} -> {response}")]
    NoHandlerFound {
        /// Short name of the request type.
        request: &'static str,
        /// Short name of the response type.
        response: &'static str,
    },

    /// A second handler was bound to an already bound request/response pair.
    #[error("More than one handler registered for {request} -> {response}")]
    AmbiguousHandlerFound {
        /// Short name of the request type.
        request: &'static str,
        /// Short name of the response type.
        response: &'static str,
    },

    /// Request validation failed.
    #[error("One or more validation failures have occurred.")]
    ValidationFailed(ValidationErrors),

    /// The request requires an authenticated principal and none is present.
    #[error("Unauthorized.")]
    Unauthorized,

    /// The principal lacks every role the request requires.
    #[error("Forbidden.")]
    Forbidden,

    /// The targeted entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A generic behavior returned an outcome that does not belong to this
    /// pipeline.
    #[error("Response type mismatch: expected {expected}")]
    ResponseTypeMismatch {
        /// Short name of the response type the caller expects.
        expected: &'static str,
    },

    /// Any other failure raised by a handler or behavior.
    #[error(transparent)]
    Unhandled(BoxError),
}

/// Coarse classification of a [`MediatorError`], for transport collaborators
/// that map failures to status signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoHandler,
    AmbiguousHandler,
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Unhandled,
}

impl MediatorError {
    /// Create a [`MediatorError::NotFound`] with a free-form message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a [`MediatorError::NotFound`] for an entity type and key.
    pub fn entity_not_found(name: &str, key: impl fmt::Display) -> Self {
        Self::NotFound(format!("Entity \"{name}\" ({key}) was not found."))
    }

    /// Wrap an arbitrary error as [`MediatorError::Unhandled`].
    pub fn unhandled<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Unhandled(error.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoHandlerFound { .. } => ErrorKind::NoHandler,
            Self::AmbiguousHandlerFound { .. } => ErrorKind::AmbiguousHandler,
            Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ResponseTypeMismatch { .. } | Self::Unhandled(_) => ErrorKind::Unhandled,
        }
    }

    /// Whether the failure was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation
                | ErrorKind::Unauthorized
                | ErrorKind::Forbidden
                | ErrorKind::NotFound
        )
    }

    /// Validation failures, if this is a [`MediatorError::ValidationFailed`].
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for MediatorError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationFailed(errors)
    }
}

/// Result type alias using MediatorError.
pub type Result<T> = std::result::Result<T, MediatorError>;
