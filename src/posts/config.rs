//! Directory configuration

use serde::{Deserialize, Serialize};

/// Key the directory document is stored under
pub const DEFAULT_DIRECTORY_KEY: &str = "$_";

/// Conditional write attempts per directory update
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Directory configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Reserved key of the directory document (default: "$_")
    #[serde(default = "default_directory_key")]
    pub directory_key: String,

    /// Attempts before an update fails as exhausted (default: 10)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_directory_key() -> String {
    DEFAULT_DIRECTORY_KEY.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            directory_key: default_directory_key(),
            max_retries: default_max_retries(),
        }
    }
}

impl DirectoryConfig {
    /// Default config with a different retry budget
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Check the values are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.directory_key.is_empty() {
            return Err("directory_key must not be empty".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be > 0".to_string());
        }
        Ok(())
    }
}
