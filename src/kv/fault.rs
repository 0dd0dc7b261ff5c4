//! Fault injection for store-level testing
//!
//! [`FaultInjectingStore`] wraps another store and fails scripted calls
//! before they reach it. A scripted fault matches on the operation kind and,
//! optionally, the key; faults are consumed in the order they were added.
//!
//! # Usage
//!
//! ```ignore
//! let store = FaultInjectingStore::new(MemoryStore::new());
//! store.fail_next(StoreOp::Put, Some("$_"), KvError::retryable("throttled"));
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use super::condition::Condition;
use super::errors::{KvError, KvResult};
use super::{Item, KeyValueStore, StoreFuture, WriteOp};

/// Store operation kinds a fault can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Put,
    Update,
    Delete,
    TransactWrite,
}

impl StoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOp::Get => "get",
            StoreOp::Put => "put",
            StoreOp::Update => "update",
            StoreOp::Delete => "delete",
            StoreOp::TransactWrite => "transact_write",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
struct Fault {
    op: StoreOp,
    key: Option<String>,
    error: KvError,
    remaining: usize,
}

impl Fault {
    fn matches(&self, op: StoreOp, keys: &[&str]) -> bool {
        self.op == op
            && match &self.key {
                Some(wanted) => keys.iter().any(|k| *k == wanted.as_str()),
                None => true,
            }
    }
}

/// Store wrapper that fails scripted calls
#[derive(Debug)]
pub struct FaultInjectingStore<S> {
    inner: S,
    faults: Mutex<VecDeque<Fault>>,
}

impl<S> FaultInjectingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Mutex::new(VecDeque::new()),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail the next matching call with `error`
    pub fn fail_next(&self, op: StoreOp, key: Option<&str>, error: KvError) {
        self.fail_times(op, key, error, 1);
    }

    /// Fail the next `times` matching calls with `error`
    pub fn fail_times(&self, op: StoreOp, key: Option<&str>, error: KvError, times: usize) {
        if times == 0 {
            return;
        }
        if let Ok(mut faults) = self.faults.lock() {
            faults.push_back(Fault {
                op,
                key: key.map(str::to_string),
                error,
                remaining: times,
            });
        }
    }

    /// Number of scripted failures not yet triggered
    pub fn pending(&self) -> usize {
        self.faults
            .lock()
            .map(|faults| faults.iter().map(|f| f.remaining).sum())
            .unwrap_or(0)
    }

    fn take(&self, op: StoreOp, keys: &[&str]) -> KvResult<()> {
        let mut faults = self
            .faults
            .lock()
            .map_err(|_| KvError::unavailable("Lock poisoned"))?;

        let Some(index) = faults.iter().position(|f| f.matches(op, keys)) else {
            return Ok(());
        };

        let error = faults[index].error.clone();
        faults[index].remaining -= 1;
        if faults[index].remaining == 0 {
            faults.remove(index);
        }
        Err(error)
    }
}

impl<S: KeyValueStore> KeyValueStore for FaultInjectingStore<S> {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Item>> {
        Box::pin(async move {
            self.take(StoreOp::Get, &[key])?;
            self.inner.get(key).await
        })
    }

    fn put<'a>(&'a self, key: &'a str, item: Item, condition: Condition) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.take(StoreOp::Put, &[key])?;
            self.inner.put(key, item, condition).await
        })
    }

    fn update<'a>(
        &'a self,
        key: &'a str,
        attributes: Item,
        condition: Condition,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.take(StoreOp::Update, &[key])?;
            self.inner.update(key, attributes, condition).await
        })
    }

    fn delete<'a>(&'a self, key: &'a str, condition: Condition) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.take(StoreOp::Delete, &[key])?;
            self.inner.delete(key, condition).await
        })
    }

    fn transact_write(&self, ops: Vec<WriteOp>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            {
                let keys: Vec<&str> = ops.iter().map(WriteOp::key).collect();
                self.take(StoreOp::TransactWrite, &keys)?;
            }
            self.inner.transact_write(ops).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[tokio::test]
    async fn test_fault_fires_once_then_passes_through() {
        let store = FaultInjectingStore::new(MemoryStore::new());
        store.fail_next(StoreOp::Put, None, KvError::retryable("throttled"));

        let first = store.put("a", Item::new(), Condition::Always).await;
        assert_eq!(first, Err(KvError::retryable("throttled")));

        store.put("a", Item::new(), Condition::Always).await.unwrap();
        assert_eq!(store.inner().len(), 1);
        assert_eq!(store.pending(), 0);
    }

    #[tokio::test]
    async fn test_fault_scoped_to_key() {
        let store = FaultInjectingStore::new(MemoryStore::new());
        store.fail_next(StoreOp::Get, Some("$_"), KvError::unavailable("timeout"));

        assert_eq!(store.get("a").await, Ok(None));
        assert_eq!(store.pending(), 1);
        assert!(store.get("$_").await.is_err());
        assert_eq!(store.pending(), 0);
    }

    #[tokio::test]
    async fn test_fail_times_counts_down() {
        let store = FaultInjectingStore::new(MemoryStore::new());
        store.fail_times(StoreOp::Delete, None, KvError::retryable("busy"), 2);

        assert!(store.delete("a", Condition::Always).await.is_err());
        assert!(store.delete("a", Condition::Always).await.is_err());
        assert!(store.delete("a", Condition::Always).await.is_ok());
    }

    #[test]
    fn test_store_op_display() {
        assert_eq!(StoreOp::TransactWrite.to_string(), "transact_write");
    }
}
