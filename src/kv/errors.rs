//! # Key-Value Store Errors
//!
//! Every failure a store can report is one of these kinds. Callers that
//! retry match on [`KvError::is_condition_failure`] and
//! [`KvError::is_retryable`] only; everything else is fatal.

use thiserror::Error;

/// Result type for key-value store operations
pub type KvResult<T> = Result<T, KvError>;

/// Key-value store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    /// A single-item write was rejected because its condition did not hold
    #[error("Condition failed for key: {key}")]
    ConditionFailed { key: String },

    /// A transactional write was rejected; nothing was applied
    #[error("Transaction canceled: condition failed on operation {operation} (key: {key})")]
    TransactionCanceled { operation: usize, key: String },

    /// The store flagged the call as safe to retry (throttling, transient faults)
    #[error("Retryable store failure: {0}")]
    Retryable(String),

    /// Infrastructure failure, including timeouts the store did not flag retryable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The request itself was malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl KvError {
    pub fn condition_failed(key: impl Into<String>) -> Self {
        Self::ConditionFailed { key: key.into() }
    }

    pub fn transaction_canceled(operation: usize, key: impl Into<String>) -> Self {
        Self::TransactionCanceled {
            operation,
            key: key.into(),
        }
    }

    pub fn retryable(msg: impl Into<String>) -> Self {
        Self::Retryable(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// True when a precondition (single-item or transactional) was not met
    pub fn is_condition_failure(&self) -> bool {
        matches!(
            self,
            Self::ConditionFailed { .. } | Self::TransactionCanceled { .. }
        )
    }

    /// True when the store marked the failure as safe to retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConditionFailed { .. } => "KV_CONDITION_FAILED",
            Self::TransactionCanceled { .. } => "KV_TRANSACTION_CANCELED",
            Self::Retryable(_) => "KV_RETRYABLE",
            Self::Unavailable(_) => "KV_UNAVAILABLE",
            Self::InvalidRequest(_) => "KV_INVALID_REQUEST",
        }
    }
}
