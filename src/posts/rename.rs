//! # Rename Coordinator
//!
//! Moves a post from one key to another. The record move is one
//! transactional write (delete old if present, insert new if absent), so no
//! reader ever sees both keys or neither. The directory follows afterwards
//! through the [`DirectoryManager`].
//!
//! The target-key fetch before the transaction is advisory: it saves a
//! round-trip in the common case. The transaction's own conditions decide
//! who wins when two renames race for the same target.

use std::sync::Arc;

use crate::kv::KeyValueStore;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::directory::replace;
use super::errors::{PostError, PostResult};
use super::manager::{DirectoryManager, DirectoryWrite};
use super::record::{Post, PostEdit};
use super::record_store::RecordStore;

/// Cross-key move of a post
pub struct RenameCoordinator<S> {
    records: RecordStore<S>,
    directory: DirectoryManager<S>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: KeyValueStore> RenameCoordinator<S> {
    pub fn new(
        records: RecordStore<S>,
        directory: DirectoryManager<S>,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            records,
            directory,
            metrics,
        }
    }

    /// Move the post at `old_key` to `edit.key`, applying the edit.
    ///
    /// Returns the stored post and the directory outcome.
    pub async fn rename(
        &self,
        old_key: &str,
        edit: &PostEdit,
    ) -> PostResult<(Post, DirectoryWrite)> {
        let old = self
            .records
            .fetch(old_key)
            .await?
            .ok_or_else(|| PostError::NotFound(old_key.to_string()))?;

        if self.records.fetch(&edit.key).await?.is_some() {
            return Err(self.conflict(old_key, &edit.key, "target_exists"));
        }

        let renamed = old.edited(edit);

        match self.records.replace(old_key, &renamed).await {
            Ok(()) => {}
            Err(PostError::Conflict { .. }) => {
                return Err(self.conflict(old_key, &edit.key, "transaction_canceled"));
            }
            Err(e) => return Err(e),
        }

        self.metrics.increment_renames_committed();
        log_event_with_fields(
            Event::PostRenamed,
            &[("from", old_key), ("to", renamed.key.as_str())],
        );

        let entry = renamed.entry();
        let outcome = self
            .directory
            .modify_entries(|entries| replace(entries, old_key, &entry))
            .await?;

        Ok((renamed, outcome))
    }

    fn conflict(&self, from: &str, to: &str, reason: &str) -> PostError {
        self.metrics.increment_renames_conflicted();
        log_event_with_fields(
            Event::RenameConflict,
            &[("from", from), ("reason", reason), ("to", to)],
        );
        PostError::conflict(from, to)
    }
}
