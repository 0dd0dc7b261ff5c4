//! # Key-Value Store
//!
//! The only external collaborator of the post subsystem: a partition-oblivious
//! store with single-key reads and writes, per-write preconditions, and an
//! all-or-nothing multi-key transactional write.
//!
//! Nothing above this module locks anything. All coordination between
//! concurrent writers goes through [`Condition`]s evaluated by the store.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - in-process store with exact conditional semantics
//! - [`FaultInjectingStore`] - wraps any store and fails scripted calls

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

pub mod condition;
pub mod errors;
pub mod fault;
pub mod memory;

pub use condition::Condition;
pub use errors::{KvError, KvResult};
pub use fault::{FaultInjectingStore, StoreOp};
pub use memory::MemoryStore;

/// A stored item: a flat JSON object of named attributes
pub type Item = Map<String, Value>;

/// Boxed future returned by every store call
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = KvResult<T>> + Send + 'a>>;

/// One operation of a transactional write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Replace the item under `key`
    Put {
        key: String,
        item: Item,
        condition: Condition,
    },
    /// Remove the item under `key`
    Delete { key: String, condition: Condition },
}

impl WriteOp {
    /// The key this operation targets
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } => key,
            WriteOp::Delete { key, .. } => key,
        }
    }

    /// The precondition guarding this operation
    pub fn condition(&self) -> &Condition {
        match self {
            WriteOp::Put { condition, .. } => condition,
            WriteOp::Delete { condition, .. } => condition,
        }
    }
}

/// Key-value store with conditional writes
///
/// Every call is a suspension point. Implementations must evaluate a write's
/// condition and apply the write as one atomic step.
pub trait KeyValueStore: Send + Sync {
    /// Read the item under `key`, or None when absent
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Item>>;

    /// Replace the item under `key` if `condition` holds
    fn put<'a>(&'a self, key: &'a str, item: Item, condition: Condition) -> StoreFuture<'a, ()>;

    /// Set the given attributes on the item under `key` if `condition` holds.
    /// Attributes not named are left untouched.
    fn update<'a>(
        &'a self,
        key: &'a str,
        attributes: Item,
        condition: Condition,
    ) -> StoreFuture<'a, ()>;

    /// Remove the item under `key` if `condition` holds.
    /// Removing an absent item under [`Condition::Always`] succeeds.
    fn delete<'a>(&'a self, key: &'a str, condition: Condition) -> StoreFuture<'a, ()>;

    /// Apply all operations or none.
    ///
    /// Fails with [`KvError::TransactionCanceled`] naming the first operation
    /// whose condition did not hold.
    fn transact_write(&self, ops: Vec<WriteOp>) -> StoreFuture<'_, ()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Item>> {
        (**self).get(key)
    }

    fn put<'a>(&'a self, key: &'a str, item: Item, condition: Condition) -> StoreFuture<'a, ()> {
        (**self).put(key, item, condition)
    }

    fn update<'a>(
        &'a self,
        key: &'a str,
        attributes: Item,
        condition: Condition,
    ) -> StoreFuture<'a, ()> {
        (**self).update(key, attributes, condition)
    }

    fn delete<'a>(&'a self, key: &'a str, condition: Condition) -> StoreFuture<'a, ()> {
        (**self).delete(key, condition)
    }

    fn transact_write(&self, ops: Vec<WriteOp>) -> StoreFuture<'_, ()> {
        (**self).transact_write(ops)
    }
}
