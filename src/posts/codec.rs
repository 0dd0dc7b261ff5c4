//! Conversion between typed values and store items

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::kv::Item;

use super::errors::{PostError, PostResult};

/// Encode `value` as the item stored under `key`
pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> PostResult<Item> {
    match serde_json::to_value(value) {
        Ok(Value::Object(item)) => Ok(item),
        Ok(_) => Err(PostError::malformed(key, "value is not an object")),
        Err(e) => Err(PostError::malformed(key, e.to_string())),
    }
}

/// Decode the item stored under `key`
pub(crate) fn decode<T: DeserializeOwned>(key: &str, item: Item) -> PostResult<T> {
    serde_json::from_value(Value::Object(item)).map_err(|e| PostError::malformed(key, e.to_string()))
}
