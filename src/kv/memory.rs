//! # In-Memory Store
//!
//! Conditional key-value store held in process memory. Conditions are
//! evaluated under the same write lock that applies the write, so every
//! conditional operation is atomic with respect to every other.

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::condition::Condition;
use super::errors::{KvError, KvResult};
use super::{Item, KeyValueStore, StoreFuture, WriteOp};

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<BTreeMap<String, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the raw item under `key`
    pub fn raw(&self, key: &str) -> Option<Item> {
        self.read().ok().and_then(|items| items.get(key).cloned())
    }

    fn read(&self) -> KvResult<RwLockReadGuard<'_, BTreeMap<String, Item>>> {
        self.items
            .read()
            .map_err(|_| KvError::unavailable("Lock poisoned"))
    }

    fn write(&self) -> KvResult<RwLockWriteGuard<'_, BTreeMap<String, Item>>> {
        self.items
            .write()
            .map_err(|_| KvError::unavailable("Lock poisoned"))
    }

    fn get_now(&self, key: &str) -> KvResult<Option<Item>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn put_now(&self, key: &str, item: Item, condition: &Condition) -> KvResult<()> {
        let mut items = self.write()?;
        if !condition.holds(items.get(key)) {
            return Err(KvError::condition_failed(key));
        }
        items.insert(key.to_string(), item);
        Ok(())
    }

    fn update_now(&self, key: &str, attributes: Item, condition: &Condition) -> KvResult<()> {
        let mut items = self.write()?;
        if !condition.holds(items.get(key)) {
            return Err(KvError::condition_failed(key));
        }
        let entry = items.entry(key.to_string()).or_default();
        for (name, value) in attributes {
            entry.insert(name, value);
        }
        Ok(())
    }

    fn delete_now(&self, key: &str, condition: &Condition) -> KvResult<()> {
        let mut items = self.write()?;
        if !condition.holds(items.get(key)) {
            return Err(KvError::condition_failed(key));
        }
        items.remove(key);
        Ok(())
    }

    fn transact_now(&self, ops: Vec<WriteOp>) -> KvResult<()> {
        if ops.is_empty() {
            return Err(KvError::invalid_request("Empty transaction"));
        }

        let mut seen = HashSet::with_capacity(ops.len());
        for op in &ops {
            if !seen.insert(op.key()) {
                return Err(KvError::invalid_request(format!(
                    "Multiple operations on key in one transaction: {}",
                    op.key()
                )));
            }
        }

        let mut items = self.write()?;

        // Check every condition before touching anything
        for (index, op) in ops.iter().enumerate() {
            if !op.condition().holds(items.get(op.key())) {
                return Err(KvError::transaction_canceled(index, op.key()));
            }
        }

        for op in ops {
            match op {
                WriteOp::Put { key, item, .. } => {
                    items.insert(key, item);
                }
                WriteOp::Delete { key, .. } => {
                    items.remove(&key);
                }
            }
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<Item>> {
        Box::pin(async move { self.get_now(key) })
    }

    fn put<'a>(&'a self, key: &'a str, item: Item, condition: Condition) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.put_now(key, item, &condition) })
    }

    fn update<'a>(
        &'a self,
        key: &'a str,
        attributes: Item,
        condition: Condition,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.update_now(key, attributes, &condition) })
    }

    fn delete<'a>(&'a self, key: &'a str, condition: Condition) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.delete_now(key, &condition) })
    }

    fn transact_write(&self, ops: Vec<WriteOp>) -> StoreFuture<'_, ()> {
        Box::pin(async move { self.transact_now(ops) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn item(value: Value) -> Item {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_put_if_absent_rejects_existing() {
        let store = MemoryStore::new();
        store
            .put("a", item(json!({"key": "a"})), Condition::NotExists)
            .await
            .unwrap();

        let err = store
            .put("a", item(json!({"key": "a", "content": "x"})), Condition::NotExists)
            .await
            .unwrap_err();
        assert_eq!(err, KvError::condition_failed("a"));
        assert_eq!(store.raw("a"), Some(item(json!({"key": "a"}))));
    }

    #[tokio::test]
    async fn test_put_guarded_by_version() {
        let store = MemoryStore::new();
        store
            .put("$_", item(json!({"version": 1})), Condition::NotExists)
            .await
            .unwrap();

        store
            .put(
                "$_",
                item(json!({"version": 2})),
                Condition::attribute_equals("version", 1u64),
            )
            .await
            .unwrap();

        let stale = store
            .put(
                "$_",
                item(json!({"version": 2})),
                Condition::attribute_equals("version", 1u64),
            )
            .await;
        assert!(stale.unwrap_err().is_condition_failure());
    }

    #[tokio::test]
    async fn test_update_merges_attributes() {
        let store = MemoryStore::new();
        store
            .put("a", item(json!({"key": "a", "content": "x", "createdAt": "t1"})), Condition::Always)
            .await
            .unwrap();

        store
            .update("a", item(json!({"content": "y"})), Condition::Exists)
            .await
            .unwrap();

        let stored = store.get("a").await.unwrap().unwrap();
        assert_eq!(stored["content"], "y");
        assert_eq!(stored["createdAt"], "t1");
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let store = MemoryStore::new();
        store.delete("ghost", Condition::Always).await.unwrap();
        assert!(store
            .delete("ghost", Condition::Exists)
            .await
            .unwrap_err()
            .is_condition_failure());
    }

    #[tokio::test]
    async fn test_transaction_all_or_nothing() {
        let store = MemoryStore::new();
        store
            .put("old", item(json!({"key": "old"})), Condition::Always)
            .await
            .unwrap();
        store
            .put("new", item(json!({"key": "new"})), Condition::Always)
            .await
            .unwrap();

        let err = store
            .transact_write(vec![
                WriteOp::Delete {
                    key: "old".into(),
                    condition: Condition::Exists,
                },
                WriteOp::Put {
                    key: "new".into(),
                    item: item(json!({"key": "new", "moved": true})),
                    condition: Condition::NotExists,
                },
            ])
            .await
            .unwrap_err();

        assert_eq!(err, KvError::transaction_canceled(1, "new"));
        assert!(store.raw("old").is_some());
        assert_eq!(store.raw("new"), Some(item(json!({"key": "new"}))));
    }

    #[tokio::test]
    async fn test_transaction_rejects_duplicate_keys() {
        let store = MemoryStore::new();
        let err = store
            .transact_write(vec![
                WriteOp::Delete {
                    key: "a".into(),
                    condition: Condition::Always,
                },
                WriteOp::Put {
                    key: "a".into(),
                    item: Item::new(),
                    condition: Condition::Always,
                },
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, KvError::InvalidRequest(_)));
    }
}
