//! postdir - short text posts with a recency-ordered directory
//!
//! Posts live as individual items in a key-value store. A single directory
//! document, kept under a reserved key, lists every post newest first and is
//! updated with optimistic concurrency control.

pub mod cli;
pub mod http_server;
pub mod kv;
pub mod observability;
pub mod posts;
