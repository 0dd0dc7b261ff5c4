//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Relaxed atomics; exactness across threads is eventual

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the post subsystem
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Directory versions written
    directory_commits: AtomicU64,
    /// Directory updates short-circuited as no-ops
    directory_noops: AtomicU64,
    /// Conditional directory writes retried
    directory_retries: AtomicU64,
    /// Directory updates that spent the whole retry budget
    directory_exhausted: AtomicU64,
    /// Records created
    posts_inserted: AtomicU64,
    /// Records edited in place
    posts_updated: AtomicU64,
    /// Record deletions
    posts_removed: AtomicU64,
    /// Creates rejected on an existing key
    collisions: AtomicU64,
    /// Renames committed
    renames_committed: AtomicU64,
    /// Renames rejected
    renames_conflicted: AtomicU64,
    /// Non-retryable store errors surfaced to callers
    store_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Directory metrics

    pub fn increment_directory_commits(&self) {
        self.directory_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_directory_noops(&self) {
        self.directory_noops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_directory_retries(&self) {
        self.directory_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_directory_exhausted(&self) {
        self.directory_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Conditional directory writes retried so far
    pub fn directory_retries(&self) -> u64 {
        self.directory_retries.load(Ordering::Relaxed)
    }

    // Record metrics

    pub fn increment_posts_inserted(&self) {
        self.posts_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_posts_updated(&self) {
        self.posts_updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_posts_removed(&self) {
        self.posts_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_collisions(&self) {
        self.collisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_renames_committed(&self) {
        self.renames_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_renames_conflicted(&self) {
        self.renames_conflicted.fetch_add(1, Ordering::Relaxed);
    }

    // Store metrics

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            directory_commits: self.directory_commits.load(Ordering::Relaxed),
            directory_noops: self.directory_noops.load(Ordering::Relaxed),
            directory_retries: self.directory_retries.load(Ordering::Relaxed),
            directory_exhausted: self.directory_exhausted.load(Ordering::Relaxed),
            posts_inserted: self.posts_inserted.load(Ordering::Relaxed),
            posts_updated: self.posts_updated.load(Ordering::Relaxed),
            posts_removed: self.posts_removed.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
            renames_committed: self.renames_committed.load(Ordering::Relaxed),
            renames_conflicted: self.renames_conflicted.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub directory_commits: u64,
    pub directory_noops: u64,
    pub directory_retries: u64,
    pub directory_exhausted: u64,
    pub posts_inserted: u64,
    pub posts_updated: u64,
    pub posts_removed: u64,
    pub collisions: u64,
    pub renames_committed: u64,
    pub renames_conflicted: u64,
    pub store_failures: u64,
}
