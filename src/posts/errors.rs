//! # Post Errors
//!
//! Business outcomes (collision, missing record, lost rename race) are
//! distinct variants from infrastructure failures, and an exhausted directory
//! update is distinct from both: the record it follows has already been
//! written.

use thiserror::Error;

use crate::kv::KvError;

/// Result type for post operations
pub type PostResult<T> = Result<T, PostError>;

/// Post subsystem errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostError {
    /// A record already exists under the key
    #[error("Post already exists: {0}")]
    AlreadyExists(String),

    /// No record exists under the key
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Rename target taken, or the rename transaction lost a race
    #[error("Rename conflict: {from} -> {to}")]
    Conflict { from: String, to: String },

    /// The directory could not be written within the retry budget.
    /// The record mutation that preceded it has been applied.
    #[error("Directory update exhausted after {attempts} attempts")]
    DirectoryUpdateExhausted { attempts: u32 },

    /// Non-retryable store failure, propagated verbatim
    #[error("Store unavailable: {0}")]
    StoreUnavailable(KvError),

    /// Empty key, or the key reserved for the directory document
    #[error("Invalid post key: '{0}'")]
    InvalidKey(String),

    /// A stored item could not be decoded
    #[error("Malformed item '{key}': {message}")]
    MalformedItem { key: String, message: String },
}

impl PostError {
    pub fn conflict(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Conflict {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedItem {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Get error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "POST_ALREADY_EXISTS",
            Self::NotFound(_) => "POST_NOT_FOUND",
            Self::Conflict { .. } => "POST_CONFLICT",
            Self::DirectoryUpdateExhausted { .. } => "DIRECTORY_UPDATE_EXHAUSTED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::InvalidKey(_) => "INVALID_KEY",
            Self::MalformedItem { .. } => "MALFORMED_ITEM",
        }
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::AlreadyExists(_) => 409,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::DirectoryUpdateExhausted { .. } => 503,
            Self::StoreUnavailable(_) => 502,
            Self::InvalidKey(_) => 400,
            Self::MalformedItem { .. } => 500,
        }
    }
}

impl From<KvError> for PostError {
    fn from(e: KvError) -> Self {
        Self::StoreUnavailable(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PostError::AlreadyExists("a".into()).status_code(), 409);
        assert_eq!(PostError::NotFound("a".into()).status_code(), 404);
        assert_eq!(PostError::conflict("a", "b").status_code(), 409);
        assert_eq!(
            PostError::DirectoryUpdateExhausted { attempts: 10 }.status_code(),
            503
        );
        assert_eq!(
            PostError::from(KvError::unavailable("down")).status_code(),
            502
        );
    }

    #[test]
    fn test_exhaustion_distinct_from_record_failures() {
        let exhausted = PostError::DirectoryUpdateExhausted { attempts: 10 };
        assert_eq!(exhausted.status_code(), 503);
        assert_ne!(exhausted.code(), PostError::AlreadyExists("a".into()).code());
        assert!(exhausted.to_string().contains("10 attempts"));
    }

    #[test]
    fn test_store_error_propagates_verbatim() {
        let source = KvError::unavailable("timeout");
        match PostError::from(source.clone()) {
            PostError::StoreUnavailable(inner) => assert_eq!(inner, source),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
