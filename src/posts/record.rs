//! # Post Records
//!
//! A post is addressed by its human-readable key and carries an immutable
//! creation time. Timestamps are stored as fixed-width ISO-8601 strings with
//! millisecond precision, so comparing the stored strings and comparing the
//! times give the same order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::directory::DirectoryEntry;

/// Current time at the precision posts are stored with
pub fn now() -> DateTime<Utc> {
    timestamp::truncate(Utc::now())
}

/// A stored post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identity, chosen by the author
    pub key: String,
    pub content: String,
    /// Set once at creation
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Set on content edits only
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new, never-edited post. `created_at` is truncated to the
    /// stored precision.
    pub fn new(key: impl Into<String>, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            created_at: timestamp::truncate(created_at),
            modified_at: None,
        }
    }

    /// Directory projection of this post
    pub fn entry(&self) -> DirectoryEntry {
        DirectoryEntry::new(self.key.clone(), self.created_at)
    }

    /// Apply an edit, keeping the creation time
    pub fn edited(&self, edit: &PostEdit) -> Post {
        Post {
            key: edit.key.clone(),
            content: edit.content.clone(),
            created_at: self.created_at,
            modified_at: Some(timestamp::truncate(edit.modified_at)),
        }
    }
}

/// New identity and content for an existing post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostEdit {
    /// New key; equal to the current key for an in-place edit
    pub key: String,
    pub content: String,
    pub modified_at: DateTime<Utc>,
}

impl PostEdit {
    pub fn new(key: impl Into<String>, content: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            modified_at: timestamp::truncate(modified_at),
        }
    }
}

/// Serde adapter for `YYYY-MM-DDTHH:MM:SS.mmmZ` timestamps
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Drop precision below one millisecond
    pub fn truncate(t: DateTime<Utc>) -> DateTime<Utc> {
        t.trunc_subsecs(3)
    }

    /// Render a timestamp in stored form
    pub fn format(t: &DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse any RFC 3339 timestamp into UTC
    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s).map(|t| t.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            t: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => serializer.serialize_str(&super::format(t)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw).map_err(de::Error::custom))
                .transpose()
        }
    }
}
