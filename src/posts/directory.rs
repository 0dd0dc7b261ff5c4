//! # Directory Document
//!
//! The store has no range query across partitions, so "all posts, newest
//! first" is answered from one aggregate item: a versioned list of
//! `{key, createdAt}` entries kept sorted on every write.
//!
//! Version 0 means the document has never been stored. Each successful write
//! stores `version + 1` together with the complete entry list.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::timestamp;

/// Listing projection of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub key: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl DirectoryEntry {
    /// `created_at` is truncated to the stored precision
    pub fn new(key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            created_at: timestamp::truncate(created_at),
        }
    }
}

/// The stored aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryDocument {
    pub version: u64,
    #[serde(default)]
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryDocument {
    /// True until the first write has been stored
    pub fn is_unmaterialized(&self) -> bool {
        self.version == 0
    }

    /// The document that replaces this one
    pub fn successor(&self, entries: Vec<DirectoryEntry>) -> DirectoryDocument {
        DirectoryDocument {
            version: self.version + 1,
            entries,
        }
    }

    /// Whether an entry for `key` is listed
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }
}

/// Newest first; equal creation times fall back to key order
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.key.cmp(&b.key))
}

/// Sort entries into directory order
pub fn sort_entries(entries: &mut [DirectoryEntry]) {
    entries.sort_by(compare_entries);
}

/// Bring entries to stored form: stored precision, directory order
pub fn normalize_entries(entries: &mut [DirectoryEntry]) {
    for entry in entries.iter_mut() {
        entry.created_at = timestamp::truncate(entry.created_at);
    }
    sort_entries(entries);
}

/// Transform: list `entry`, replacing any entry already listed under its key
pub fn upsert(mut entries: Vec<DirectoryEntry>, entry: &DirectoryEntry) -> Vec<DirectoryEntry> {
    entries.retain(|e| e.key != entry.key);
    entries.push(entry.clone());
    entries
}

/// Transform: drop the entry listed under `key`, if any
pub fn remove(mut entries: Vec<DirectoryEntry>, key: &str) -> Vec<DirectoryEntry> {
    entries.retain(|e| e.key != key);
    entries
}

/// Transform: drop `old_key` and list `entry` in its place
pub fn replace(entries: Vec<DirectoryEntry>, old_key: &str, entry: &DirectoryEntry) -> Vec<DirectoryEntry> {
    upsert(remove(entries, old_key), entry)
}
