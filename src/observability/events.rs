//! Observable events of the post subsystem
//!
//! Events are explicit and typed; each maps to one stable log event name.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP server accepting connections
    Serving,

    // Records
    /// Record created and listed
    PostInserted,
    /// Create rejected, key already taken
    PostCollision,
    /// Content edited in place
    PostUpdated,
    /// Record moved to a new key
    PostRenamed,
    /// Rename rejected, target taken or source gone
    RenameConflict,
    /// Record deleted
    PostRemoved,

    // Directory
    /// New directory version written
    DirectoryCommitted,
    /// Transform produced no change, nothing written
    DirectoryUnchanged,
    /// Conditional write lost a race or was throttled
    DirectoryRetry,
    /// Retry budget spent without a successful write
    DirectoryExhausted,

    // Store
    /// Store error that ended a record or directory operation
    StoreFailure,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::Serving => "POSTDIR_SERVING",

            Event::PostInserted => "POST_INSERTED",
            Event::PostCollision => "POST_COLLISION",
            Event::PostUpdated => "POST_UPDATED",
            Event::PostRenamed => "POST_RENAMED",
            Event::RenameConflict => "POST_RENAME_CONFLICT",
            Event::PostRemoved => "POST_REMOVED",

            Event::DirectoryCommitted => "DIRECTORY_COMMITTED",
            Event::DirectoryUnchanged => "DIRECTORY_UNCHANGED",
            Event::DirectoryRetry => "DIRECTORY_RETRY",
            Event::DirectoryExhausted => "DIRECTORY_EXHAUSTED",

            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Events that indicate an operation failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::DirectoryExhausted | Event::StoreFailure)
    }

    /// Expected-but-notable outcomes
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::PostCollision | Event::RenameConflict | Event::DirectoryRetry
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
