//! # Write Conditions
//!
//! Preconditions evaluated by the store against the item currently stored
//! under a key, atomically with the write they guard.

use serde_json::Value;

use super::Item;

/// Precondition attached to a put, update, delete or transactional operation
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No precondition
    Always,
    /// An item must currently exist under the key
    Exists,
    /// No item may currently exist under the key
    NotExists,
    /// The stored item must carry `name` with exactly `value`.
    /// False when the item is absent.
    AttributeEquals { name: String, value: Value },
}

impl Condition {
    /// Shorthand for [`Condition::AttributeEquals`]
    pub fn attribute_equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::AttributeEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Evaluate against the current item (None = absent)
    pub fn holds(&self, current: Option<&Item>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Exists => current.is_some(),
            Condition::NotExists => current.is_none(),
            Condition::AttributeEquals { name, value } => current
                .and_then(|item| item.get(name))
                .map(|stored| stored == value)
                .unwrap_or(false),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::Always
    }
}
