//! # Post Service
//!
//! The contract offered to request handlers. Every mutation writes the
//! record first and the directory second; the directory update runs through
//! the [`DirectoryManager`] regardless of which mutation triggered it.
//!
//! Between the two writes the directory can briefly disagree with the
//! records. If the directory update exhausts its retry budget the caller gets
//! [`PostError::DirectoryUpdateExhausted`] and the record mutation stands.

use std::sync::Arc;

use crate::kv::KeyValueStore;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::config::DirectoryConfig;
use super::directory::{remove, upsert, DirectoryEntry};
use super::errors::{PostError, PostResult};
use super::manager::{DirectoryManager, DirectoryWrite};
use super::record::{Post, PostEdit};
use super::record_store::RecordStore;
use super::rename::RenameCoordinator;

/// CRUD plus recency listing over posts
pub struct PostService<S> {
    records: RecordStore<S>,
    directory: DirectoryManager<S>,
    renames: RenameCoordinator<S>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: KeyValueStore> PostService<S> {
    pub fn new(store: Arc<S>, config: DirectoryConfig) -> Self {
        Self::with_metrics(store, config, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(store: Arc<S>, config: DirectoryConfig, metrics: Arc<MetricsRegistry>) -> Self {
        let records = RecordStore::new(Arc::clone(&store), Arc::clone(&metrics));
        let directory = DirectoryManager::new(store, config, Arc::clone(&metrics));
        let renames = RenameCoordinator::new(records.clone(), directory.clone(), Arc::clone(&metrics));
        Self {
            records,
            directory,
            renames,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn directory(&self) -> &DirectoryManager<S> {
        &self.directory
    }

    fn validate_key(&self, key: &str) -> PostResult<()> {
        if key.is_empty() || key == self.directory.config().directory_key {
            return Err(PostError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    /// Create `post` and list it.
    ///
    /// A taken key fails with [`PostError::AlreadyExists`] and leaves the
    /// directory untouched.
    pub async fn insert(&self, post: Post) -> PostResult<DirectoryWrite> {
        self.validate_key(&post.key)?;

        if let Err(e) = self.records.create(&post).await {
            if let PostError::AlreadyExists(ref key) = e {
                self.metrics.increment_collisions();
                log_event_with_fields(Event::PostCollision, &[("key", key.as_str())]);
            }
            return Err(e);
        }

        self.metrics.increment_posts_inserted();
        log_event_with_fields(Event::PostInserted, &[("key", post.key.as_str())]);

        let entry = post.entry();
        self.directory.modify_entries(|entries| upsert(entries, &entry)).await
    }

    /// The post under `key`, or None
    pub async fn select(&self, key: &str) -> PostResult<Option<Post>> {
        self.validate_key(key)?;
        self.records.fetch(key).await
    }

    /// Edit the post at `old_key`.
    ///
    /// Same key: content and modification time are overwritten in place and
    /// the directory is not touched. New key: the post is renamed, keeping its
    /// creation time.
    pub async fn update(&self, old_key: &str, edit: PostEdit) -> PostResult<()> {
        self.validate_key(old_key)?;
        self.validate_key(&edit.key)?;

        if edit.key == old_key {
            self.records
                .update_content(old_key, &edit.content, edit.modified_at)
                .await?;
            self.metrics.increment_posts_updated();
            log_event_with_fields(Event::PostUpdated, &[("key", old_key)]);
            return Ok(());
        }

        self.renames.rename(old_key, &edit).await?;
        Ok(())
    }

    /// Delete the post under `key` and unlist it. Absent keys are a no-op.
    pub async fn remove(&self, key: &str) -> PostResult<DirectoryWrite> {
        self.validate_key(key)?;

        self.records.delete(key).await?;
        self.metrics.increment_posts_removed();
        log_event_with_fields(Event::PostRemoved, &[("key", key)]);

        self.directory.modify_entries(|entries| remove(entries, key)).await
    }

    /// Directory entries, newest first, exactly as stored
    pub async fn list(&self) -> PostResult<Vec<DirectoryEntry>> {
        Ok(self.directory.fetch().await?.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn service() -> PostService<MemoryStore> {
        PostService::new(Arc::new(MemoryStore::new()), DirectoryConfig::default())
    }

    fn keys(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[tokio::test]
    async fn test_insert_lists_newest_first() {
        let posts = service();
        posts.insert(Post::new("a", "x", at(1))).await.unwrap();
        posts.insert(Post::new("b", "y", at(2))).await.unwrap();

        assert_eq!(keys(&posts.list().await.unwrap()), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_leaves_directory() {
        let posts = service();
        posts.insert(Post::new("a", "x", at(1))).await.unwrap();
        let before = posts.directory().fetch().await.unwrap();

        let err = posts.insert(Post::new("a", "other", at(5))).await.unwrap_err();

        assert_eq!(err, PostError::AlreadyExists("a".into()));
        assert_eq!(posts.directory().fetch().await.unwrap(), before);
        assert_eq!(posts.metrics().snapshot().collisions, 1);
    }

    #[tokio::test]
    async fn test_in_place_update_skips_directory() {
        let posts = service();
        posts.insert(Post::new("a", "x", at(1))).await.unwrap();

        posts
            .update("a", PostEdit::new("a", "edited", at(3)))
            .await
            .unwrap();

        let post = posts.select("a").await.unwrap().unwrap();
        assert_eq!(post.content, "edited");
        assert_eq!(post.modified_at, Some(at(3)));
        assert_eq!(posts.directory().fetch().await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn test_in_place_update_of_missing_post() {
        let posts = service();
        let err = posts
            .update("ghost", PostEdit::new("ghost", "x", at(3)))
            .await
            .unwrap_err();
        assert_eq!(err, PostError::NotFound("ghost".into()));
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let posts = service();
        posts.insert(Post::new("a", "x", at(1))).await.unwrap();

        let outcome = posts.remove("ghost").await.unwrap();
        assert_eq!(outcome, DirectoryWrite::Unchanged { version: 1 });
    }

    #[tokio::test]
    async fn test_reserved_key_rejected_everywhere() {
        let posts = service();
        posts.insert(Post::new("a", "x", at(1))).await.unwrap();

        let reserved = PostError::InvalidKey("$_".into());
        assert_eq!(posts.insert(Post::new("$_", "x", at(2))).await.unwrap_err(), reserved);
        assert_eq!(posts.select("$_").await.unwrap_err(), reserved);
        assert_eq!(posts.remove("$_").await.unwrap_err(), reserved);
        assert_eq!(
            posts.update("a", PostEdit::new("$_", "x", at(3))).await.unwrap_err(),
            reserved
        );
        assert_eq!(posts.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let posts = service();
        assert_eq!(
            posts.insert(Post::new("", "x", at(1))).await.unwrap_err(),
            PostError::InvalidKey(String::new())
        );
    }
}
