use std::sync::Mutex;

use async_trait::async_trait;

use super::base::{CredentialStore, TokenPair};
use crate::error::Result;

/// Keeps the token pair in memory only. Used when persistence is disabled
/// and throughout the test suite.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<TokenPair>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// A store pre-loaded with credentials, for tests that start signed in.
    pub fn with_pair(pair: TokenPair) -> Self {
        MemoryStore {
            slot: Mutex::new(Some(pair)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> Result<Option<TokenPair>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, pair: &TokenPair) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
