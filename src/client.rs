use std::sync::Arc;
use std::time::Duration;

use crate::api::base::Backend;
use crate::api::{Account, Chat, Notifications, Profiles, Recipes};
use crate::config::ConfigV1;
use crate::error::Result;
use crate::session::SessionManager;
use crate::storage::create_store;

/// The platform client. Build one per application and clone it freely; all
/// clones share the same HTTP pool, credential store and session.
///
/// The session mediator is the only writer of credentials; the endpoint
/// groups handed out here are read-side consumers of it.
#[derive(Clone)]
pub struct Client {
    session: Arc<SessionManager>,
    backend: Arc<Backend>,
    notifications: Arc<Notifications>,
}

impl Client {
    /// Builds a client from configuration and restores any persisted session.
    /// No network traffic happens here: restoration only reads storage and
    /// the access token's own expiry claim.
    pub async fn connect(config: &ConfigV1) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
            .build()?;

        let store = create_store(&config.storage)?;
        let session = Arc::new(SessionManager::new(http.clone(), &config.api, store));
        session.restore().await;

        let backend = Arc::new(Backend::new(
            http,
            config.api.normalized_base_url().to_string(),
            session.clone(),
        ));
        let notifications = Arc::new(Notifications::new(backend.clone()));

        Ok(Client {
            session,
            backend,
            notifications,
        })
    }

    /// The session mediator: login/logout, `valid_token`, the user stream.
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn recipes(&self) -> Recipes {
        Recipes::new(self.backend.clone())
    }

    pub fn profiles(&self) -> Profiles {
        Profiles::new(self.backend.clone())
    }

    pub fn account(&self) -> Account {
        Account::new(self.backend.clone())
    }

    pub fn chat(&self) -> Chat {
        Chat::new(self.backend.clone())
    }

    /// Notifications are stateful (badge stream, viewing flag), so one shared
    /// instance serves the whole application.
    pub fn notifications(&self) -> Arc<Notifications> {
        self.notifications.clone()
    }
}
