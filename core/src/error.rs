//! Typed failures raised by resource modules.
//!
//! Resource modules never build wire responses themselves. They raise a
//! [`ContentError`] and let it travel unmodified to the boundary, where the
//! web layer translates its [`ErrorKind`] into a status and a stable code.

use thiserror::Error;

/// Closed classification of every failure the service can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed identifier or filter
    InvalidInput,
    /// Referenced resource does not exist
    NotFound,
    /// Caller is not authenticated
    Unauthorized,
    /// Caller is authenticated but not allowed
    Forbidden,
    /// Anything unclassified
    Internal,
}

/// Failure raised while serving a content request.
#[derive(Debug, Error)]
pub enum ContentError {
    /// A path or query value could not be interpreted
    #[error("{0}")]
    InvalidInput(String),

    /// The requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Credentials do not grant access
    #[error("{0}")]
    Forbidden(String),

    /// The backing store failed
    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Any other unexpected condition
    #[error("{0}")]
    Internal(String),
}

impl ContentError {
    /// Shorthand for [`ContentError::InvalidInput`].
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Shorthand for [`ContentError::NotFound`]; `resource` reads like
    /// `"Song lesson"`.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Wrap a store error.
    #[must_use]
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    /// Classification used by the boundary.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Storage(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result alias for resource module operations.
pub type Result<T> = std::result::Result<T, ContentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_classified() {
        assert_eq!(ContentError::invalid_input("Invalid id").kind(), ErrorKind::InvalidInput);
        assert_eq!(ContentError::not_found("Language").kind(), ErrorKind::NotFound);
        assert_eq!(ContentError::Unauthorized("no token".into()).kind(), ErrorKind::Unauthorized);
        assert_eq!(ContentError::Forbidden("nope".into()).kind(), ErrorKind::Forbidden);
        assert_eq!(ContentError::Internal("boom".into()).kind(), ErrorKind::Internal);
        assert_eq!(
            ContentError::storage(std::io::Error::other("db down")).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn display_messages() {
        assert_eq!(ContentError::not_found("Song lesson").to_string(), "Song lesson not found");
        assert_eq!(ContentError::invalid_input("Invalid courseId").to_string(), "Invalid courseId");
        assert_eq!(
            ContentError::storage(std::io::Error::other("db down")).to_string(),
            "storage failure: db down"
        );
    }

    #[test]
    fn storage_keeps_source() {
        use std::error::Error as _;
        let err = ContentError::storage(std::io::Error::other("db down"));
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("db down"));
    }
}
