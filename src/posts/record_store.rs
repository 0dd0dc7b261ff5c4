//! # Record Store
//!
//! Single-key CRUD over posts. Creation and renaming are conditional, so an
//! identity collision is detected by the store instead of silently
//! overwriting another author's post.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::kv::{Condition, Item, KeyValueStore, KvError, WriteOp};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::codec::{decode, encode};
use super::errors::{PostError, PostResult};
use super::record::{timestamp, Post};

/// Count and log a store error that ends the operation
pub(crate) fn store_failure(metrics: &MetricsRegistry, key: &str, error: KvError) -> PostError {
    metrics.increment_store_failures();
    log_event_with_fields(
        Event::StoreFailure,
        &[
            ("code", error.code()),
            ("key", key),
            ("message", error.to_string().as_str()),
        ],
    );
    PostError::StoreUnavailable(error)
}

/// CRUD over individual posts
pub struct RecordStore<S> {
    store: Arc<S>,
    metrics: Arc<MetricsRegistry>,
}

impl<S> Clone for RecordStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(store: Arc<S>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }

    fn failed(&self, key: &str, error: KvError) -> PostError {
        store_failure(&self.metrics, key, error)
    }

    /// Insert `post` only if nothing is stored under its key
    pub async fn create(&self, post: &Post) -> PostResult<()> {
        let item = encode(&post.key, post)?;
        match self.store.put(&post.key, item, Condition::NotExists).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_condition_failure() => Err(PostError::AlreadyExists(post.key.clone())),
            Err(e) => Err(self.failed(&post.key, e)),
        }
    }

    /// The post under `key`, or None when absent
    pub async fn fetch(&self, key: &str) -> PostResult<Option<Post>> {
        let found = self.store.get(key).await.map_err(|e| self.failed(key, e))?;
        match found {
            Some(item) => decode(key, item).map(Some),
            None => Ok(None),
        }
    }

    /// Overwrite content and modification time of an existing post.
    ///
    /// No version check: concurrent edits are last-writer-wins. The write is
    /// guarded on existence so a missing post is reported rather than
    /// materialized without a creation time.
    pub async fn update_content(
        &self,
        key: &str,
        content: &str,
        modified_at: DateTime<Utc>,
    ) -> PostResult<()> {
        let mut attributes = Item::new();
        attributes.insert("content".to_string(), Value::from(content));
        attributes.insert(
            "modifiedAt".to_string(),
            Value::from(timestamp::format(&modified_at)),
        );

        match self.store.update(key, attributes, Condition::Exists).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_condition_failure() => Err(PostError::NotFound(key.to_string())),
            Err(e) => Err(self.failed(key, e)),
        }
    }

    /// Remove the post under `key`; absent is not an error
    pub async fn delete(&self, key: &str) -> PostResult<()> {
        self.store
            .delete(key, Condition::Always)
            .await
            .map_err(|e| self.failed(key, e))
    }

    /// Atomically delete `old_key` and insert `post` under its own key.
    ///
    /// Commits only if `old_key` still exists and the new key is still free;
    /// otherwise nothing is applied and the rename is a conflict.
    pub async fn replace(&self, old_key: &str, post: &Post) -> PostResult<()> {
        let ops = vec![
            WriteOp::Delete {
                key: old_key.to_string(),
                condition: Condition::Exists,
            },
            WriteOp::Put {
                key: post.key.clone(),
                item: encode(&post.key, post)?,
                condition: Condition::NotExists,
            },
        ];

        match self.store.transact_write(ops).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_condition_failure() => Err(PostError::conflict(old_key, &post.key)),
            Err(e) => Err(self.failed(old_key, e)),
        }
    }
}
