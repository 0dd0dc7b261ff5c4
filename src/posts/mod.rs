//! # Posts
//!
//! Short text records in a key-value store, plus a recency-ordered directory
//! over them kept in a single optimistically-versioned document.
//!
//! # Components
//!
//! - [`RecordStore`] - single-key CRUD, collision-safe creation
//! - [`DirectoryDocument`] - versioned, sorted entry list
//! - [`DirectoryManager`] - bounded optimistic retry loop over the document
//! - [`RenameCoordinator`] - transactional move between keys
//! - [`PostService`] - insert / select / update / remove / list
//!
//! # Consistency
//!
//! Once no writer is in flight, the keys listed in the directory equal the
//! keys of the stored posts. While a mutation is in flight, or after one
//! failed with [`PostError::DirectoryUpdateExhausted`], they may differ.

mod codec;
pub mod config;
pub mod directory;
pub mod errors;
pub mod manager;
pub mod record;
pub mod record_store;
pub mod rename;
pub mod service;

pub use config::{DirectoryConfig, DEFAULT_DIRECTORY_KEY, DEFAULT_MAX_RETRIES};
pub use directory::{DirectoryDocument, DirectoryEntry};
pub use errors::{PostError, PostResult};
pub use manager::{DirectoryManager, DirectoryWrite};
pub use record::{now, Post, PostEdit};
pub use record_store::RecordStore;
pub use rename::RenameCoordinator;
pub use service::PostService;
