use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{file_store::FileStore, memory_store::MemoryStore};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};

/// The credential of record: an access token plus the refresh token used to
/// renew it. Persisted as a JSON document with the platform's two historical
/// key names.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    #[serde(rename = "token")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        TokenPair {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// The CredentialStore trait abstracts token-pair persistence (load at
/// startup, save after login/refresh, clear on logout).
///
/// Only the session manager writes through this trait; consumers never touch
/// stored credentials directly.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<TokenPair>>;
    async fn save(&self, pair: &TokenPair) -> Result<()>;
    async fn clear(&self) -> Result<()>;
    fn is_persistent(&self) -> bool {
        // Default implementation should return always true for real stores.
        // The in-memory store returns false so we can write better debug messages.
        true
    }
}

/// Creates a concrete store implementation based on the StorageConfig.
/// If `storage.enabled = false`, returns the in-memory store. Otherwise,
/// picks the specified backend.
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>> {
    if !config.enabled {
        info!("Credential storage is disabled. Sessions will not survive restarts.");
        return Ok(Arc::new(MemoryStore::new()));
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!(path = %file_config.path.display(), "Using file-backed credential store.");
            Ok(Arc::new(FileStore::new(file_config)))
        }
        None => Err(Error::Storage(
            "storage is enabled, but no backend config is provided".to_string(),
        )),
    }
}
