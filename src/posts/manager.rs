//! # Directory Manager
//!
//! Applies a pure transformation to the directory's entry list without
//! losing concurrent updates. Each attempt fetches the document, transforms
//! and re-sorts the entries, and writes the successor version back under a
//! condition on the version it read:
//!
//! - version 0 (never stored): write only if the key is still absent
//! - otherwise: write only if the stored version is still the one read
//!
//! A writer that loses the race sees a condition failure and starts over from
//! the winner's state. Store failures flagged retryable are treated the same
//! way. Anything else ends the update immediately.
//!
//! Only this manager writes the directory document.

use std::sync::Arc;

use serde_json::Value;

use crate::kv::{Condition, KeyValueStore};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};

use super::codec::{decode, encode};
use super::config::DirectoryConfig;
use super::directory::{normalize_entries, DirectoryDocument, DirectoryEntry};
use super::errors::{PostError, PostResult};
use super::record_store::store_failure;

/// Outcome of a successful directory update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryWrite {
    /// The transform changed nothing; no version was spent
    Unchanged { version: u64 },
    /// A new version was stored
    Committed { version: u64 },
}

impl DirectoryWrite {
    /// Version of the document after the update
    pub fn version(&self) -> u64 {
        match self {
            DirectoryWrite::Unchanged { version } => *version,
            DirectoryWrite::Committed { version } => *version,
        }
    }
}

/// Optimistic read-transform-write over the directory document
pub struct DirectoryManager<S> {
    store: Arc<S>,
    config: DirectoryConfig,
    metrics: Arc<MetricsRegistry>,
}

impl<S> Clone for DirectoryManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S: KeyValueStore> DirectoryManager<S> {
    pub fn new(store: Arc<S>, config: DirectoryConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            store,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Current document, or the version-0 default when never stored
    pub async fn fetch(&self) -> PostResult<DirectoryDocument> {
        let key = self.config.directory_key.as_str();
        let found = self
            .store
            .get(key)
            .await
            .map_err(|e| store_failure(&self.metrics, key, e))?;
        match found {
            Some(item) => decode(key, item),
            None => Ok(DirectoryDocument::default()),
        }
    }

    /// Apply `transform` to the entry list and store the result.
    ///
    /// `transform` may run once per attempt and must be pure. The result is
    /// re-sorted and truncated to stored precision before comparison, so
    /// transforms may append in any order.
    pub async fn modify_entries<F>(&self, transform: F) -> PostResult<DirectoryWrite>
    where
        F: Fn(Vec<DirectoryEntry>) -> Vec<DirectoryEntry> + Send + Sync,
    {
        let key = self.config.directory_key.as_str();
        let max = self.config.max_retries;

        for attempt in 1..=max {
            let current = self.fetch().await?;

            let mut entries = transform(current.entries.clone());
            normalize_entries(&mut entries);

            if entries == current.entries {
                self.metrics.increment_directory_noops();
                Logger::trace(
                    Event::DirectoryUnchanged.as_str(),
                    &[("version", current.version.to_string().as_str())],
                );
                return Ok(DirectoryWrite::Unchanged {
                    version: current.version,
                });
            }

            let next = current.successor(entries);
            let mut item = encode(key, &next)?;
            item.insert("key".to_string(), Value::from(key));

            let condition = if current.is_unmaterialized() {
                Condition::NotExists
            } else {
                Condition::attribute_equals("version", current.version)
            };

            match self.store.put(key, item, condition).await {
                Ok(()) => {
                    self.metrics.increment_directory_commits();
                    log_event_with_fields(
                        Event::DirectoryCommitted,
                        &[
                            ("attempt", attempt.to_string().as_str()),
                            ("entries", next.entries.len().to_string().as_str()),
                            ("version", next.version.to_string().as_str()),
                        ],
                    );
                    return Ok(DirectoryWrite::Committed {
                        version: next.version,
                    });
                }
                Err(e) if e.is_condition_failure() || e.is_retryable() => {
                    self.metrics.increment_directory_retries();
                    log_event_with_fields(
                        Event::DirectoryRetry,
                        &[
                            ("attempt", attempt.to_string().as_str()),
                            ("reason", e.code()),
                            ("read_version", current.version.to_string().as_str()),
                        ],
                    );
                }
                Err(e) => return Err(store_failure(&self.metrics, key, e)),
            }
        }

        self.metrics.increment_directory_exhausted();
        log_event_with_fields(Event::DirectoryExhausted, &[("attempts", max.to_string().as_str())]);
        Err(PostError::DirectoryUpdateExhausted { attempts: max })
    }
}
