use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::file_store::FileStoreConfig;

/// A wrapper for the credential-store configuration:
/// - enabled: if false, credentials live in memory only and die with the process.
/// - backend: the actual persistence backend.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
pub struct StorageConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

impl StorageConfig {
    /// In-memory-only storage; sessions are not restored across restarts.
    pub fn disabled() -> Self {
        StorageConfig {
            enabled: false,
            backend: None,
        }
    }
}

/// The available persistence backends, differentiated via a "type" tag in YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "file")]
    File(FileStoreConfig),
    // Add more variants here as needed (e.g. an OS keychain backend).
}
