use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{CredentialStore, TokenPair};
use crate::error::{Error, Result};

/// Config for the file-backed credential store.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    /// Where the credential document lives, e.g. "~/.config/ladle/credentials.json"
    /// (already expanded by the caller; no tilde handling here).
    pub path: PathBuf,
}

/// Persists the token pair as a small JSON document on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(config: &FileStoreConfig) -> Self {
        FileStore {
            path: config.path.clone(),
        }
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn load(&self) -> Result<Option<TokenPair>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Storage(format!("read {}: {}", self.path.display(), e))),
        };
        let pair = serde_json::from_str::<TokenPair>(&raw)
            .map_err(|e| Error::Storage(format!("parse {}: {}", self.path.display(), e)))?;
        Ok(Some(pair))
    }

    async fn save(&self, pair: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("create {}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string(pair)
            .map_err(|e| Error::Storage(format!("encode credentials: {}", e)))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| Error::Storage(format!("write {}: {}", self.path.display(), e)))?;
        debug!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!(
                "remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
