use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::claims;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{AuthResponse, User};
use crate::storage::{CredentialStore, TokenPair};

/// Payload for creating an account.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Outcome of a settled refresh, published to every parked caller.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Token(String),
    Failed,
}

/// The refresh single-flight state machine. At most one refresh request is
/// outstanding at any time; callers arriving while one is in flight park on
/// the receiver instead of sending a second request.
enum RefreshState {
    Idle,
    InFlight(watch::Receiver<Option<RefreshOutcome>>),
}

struct SessionInner {
    credentials: Option<TokenPair>,
    refresh: RefreshState,
}

/// Owns the token pair and mediates every authenticated request.
///
/// The session is derived state: authenticated iff a non-expired access token
/// is stored. Consumers read through [`SessionManager::valid_token`] or
/// observe [`SessionManager::subscribe`]; only this type ever writes the
/// credential of record.
pub struct SessionManager {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    inner: Mutex<SessionInner>,
    current_user: watch::Sender<Option<User>>,
}

impl SessionManager {
    pub fn new(http: reqwest::Client, api: &ApiConfig, store: Arc<dyn CredentialStore>) -> Self {
        let (current_user, _) = watch::channel(None);
        SessionManager {
            http,
            base_url: api.normalized_base_url().to_string(),
            store,
            inner: Mutex::new(SessionInner {
                credentials: None,
                refresh: RefreshState::Idle,
            }),
            current_user,
        }
    }

    /// Loads persisted credentials, restoring the session without a network
    /// call. The pair is kept only while its access token still decodes as
    /// unexpired; anything else clears storage and the client starts signed
    /// out.
    pub async fn restore(&self) {
        match self.store.load().await {
            Ok(Some(pair)) if !claims::is_expired(&pair.access_token) => {
                self.lock_inner().credentials = Some(pair);
                info!("session restored from stored credentials");
            }
            Ok(Some(_)) => {
                debug!("stored access token expired; clearing credentials");
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "stored credentials could not be cleared");
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "stored credentials unreadable; starting signed out");
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "stored credentials could not be cleared");
                }
            }
        }
    }

    /// Returns an access token guaranteed usable for the next outgoing
    /// request, refreshing first if the stored one has expired.
    ///
    /// Concurrent callers that find an expired token share one refresh
    /// request and observe the same outcome. Fails with
    /// [`Error::Unauthenticated`] when no credentials are stored or the
    /// refresh credential is rejected; the caller must not dispatch its
    /// request and should route the user back to login.
    pub async fn valid_token(&self) -> Result<String> {
        let mut rx = {
            let mut inner = self.lock_inner();
            let Some(pair) = inner.credentials.clone() else {
                return Err(Error::Unauthenticated);
            };
            if !claims::is_expired(&pair.access_token) {
                return Ok(pair.access_token);
            }
            if let RefreshState::InFlight(rx) = &inner.refresh {
                rx.clone()
            } else {
                let (tx, rx) = watch::channel(None);
                inner.refresh = RefreshState::InFlight(rx);
                drop(inner);
                return self.run_refresh(pair.refresh_token, tx).await;
            }
        };

        // Parked on a refresh another caller started.
        let outcome = match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(guard) => match guard.as_ref() {
                Some(RefreshOutcome::Token(token)) => Ok(token.clone()),
                _ => Err(Error::Unauthenticated),
            },
            // The refreshing caller always publishes before releasing the
            // sender, so a closed channel still means the session ended.
            Err(_) => Err(Error::Unauthenticated),
        };
        outcome
    }

    /// Drives the single in-flight refresh: one network call, then publish
    /// the outcome to every parked caller. A failed refresh is terminal for
    /// the session; both tokens are discarded and never retried.
    async fn run_refresh(
        &self,
        refresh_token: String,
        tx: watch::Sender<Option<RefreshOutcome>>,
    ) -> Result<String> {
        debug!("access token expired; refreshing");
        match self.request_refresh(&refresh_token).await {
            Ok(pair) => {
                let installed = {
                    let mut inner = self.lock_inner();
                    inner.refresh = RefreshState::Idle;
                    // A logout that raced the refresh wins; do not resurrect
                    // the session it ended.
                    if inner.credentials.is_some() {
                        inner.credentials = Some(pair.clone());
                        true
                    } else {
                        false
                    }
                };
                if !installed {
                    let _ = tx.send(Some(RefreshOutcome::Failed));
                    return Err(Error::Unauthenticated);
                }
                if let Err(e) = self.store.save(&pair).await {
                    warn!(error = %e, "refreshed credentials could not be persisted");
                }
                let _ = tx.send(Some(RefreshOutcome::Token(pair.access_token.clone())));
                info!("session refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed; ending session");
                {
                    let mut inner = self.lock_inner();
                    inner.refresh = RefreshState::Idle;
                    inner.credentials = None;
                }
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "stored credentials could not be cleared");
                }
                let _ = tx.send(Some(RefreshOutcome::Failed));
                self.current_user.send_replace(None);
                Err(Error::Unauthenticated)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        #[derive(Deserialize)]
        struct RefreshResponse {
            token: String,
            #[serde(rename = "refreshToken")]
            refresh_token: String,
        }

        let url = format!("{}/auth/refresh-token", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }
        let body: RefreshResponse = response.json().await?;
        Ok(TokenPair::new(body.token, body.refresh_token))
    }

    /// Authenticates with email and password, stores the returned token pair
    /// and publishes the user on the session stream.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let url = format!("{}/auth/login", self.base_url);
        let body = json!({
            "email": email.trim().to_lowercase(),
            "password": password.trim(),
        });
        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }
        let auth: AuthResponse = response.json().await?;
        self.install_session(auth).await
    }

    /// Creates an account; the server signs the new user straight in.
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let url = format!("{}/auth/register", self.base_url);
        let body = json!({
            "name": registration.name.trim(),
            "username": registration.username.trim(),
            "email": registration.email.trim().to_lowercase(),
            "password": registration.password.trim(),
        });
        let response = self.http.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }
        let auth: AuthResponse = response.json().await?;
        self.install_session(auth).await
    }

    async fn install_session(&self, auth: AuthResponse) -> Result<User> {
        let pair = TokenPair::new(auth.token, auth.refresh_token);
        self.lock_inner().credentials = Some(pair.clone());
        if let Err(e) = self.store.save(&pair).await {
            warn!(error = %e, "credentials could not be persisted");
        }
        self.current_user.send_replace(Some(auth.user.clone()));
        info!(username = %auth.user.username, "signed in");
        Ok(auth.user)
    }

    /// Discards the credential of record and announces the end of the session.
    pub async fn logout(&self) {
        self.lock_inner().credentials = None;
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "stored credentials could not be cleared");
        }
        self.current_user.send_replace(None);
        info!("signed out");
    }

    /// True while a non-expired access token is stored. Purely derived;
    /// performs no I/O.
    pub fn is_authenticated(&self) -> bool {
        self.lock_inner()
            .credentials
            .as_ref()
            .map(|pair| !claims::is_expired(&pair.access_token))
            .unwrap_or(false)
    }

    /// Stream of the signed-in user. Yields `None` when the session ends.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    /// Snapshot of the signed-in user's profile, if one has been published.
    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    /// Publishes a fresh profile on the session stream, e.g. after a profile
    /// update or a profile fetch hydrated more fields.
    pub fn publish_user(&self, user: User) {
        self.current_user.send_replace(Some(user));
    }

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::claims::{decode_unverified, Claims};
    use crate::storage::memory_store::MemoryStore;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use mockito::Server;

    fn mint(exp_offset_secs: i64) -> String {
        let claims = Claims {
            exp: Utc::now().timestamp() + exp_offset_secs,
            iat: Some(Utc::now().timestamp()),
            user_id: Some("u1".to_string()),
            email: Some("u1@example.com".to_string()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .expect("token should encode")
    }

    fn manager_with(base_url: &str, store: MemoryStore) -> SessionManager {
        SessionManager::new(
            reqwest::Client::new(),
            &ApiConfig::new(base_url),
            Arc::new(store),
        )
    }

    fn refresh_body(access: &str, refresh: &str) -> String {
        format!(r#"{{"token": "{}", "refreshToken": "{}"}}"#, access, refresh)
    }

    /// Test that a stored, unexpired token is returned without any network
    /// traffic.
    #[tokio::test]
    async fn fresh_token_needs_no_network() {
        let token = mint(3600);
        let manager = manager_with(
            "http://127.0.0.1:9/api",
            MemoryStore::with_pair(TokenPair::new(&token, "refresh")),
        );
        manager.restore().await;

        assert!(manager.is_authenticated());
        let got = manager.valid_token().await.expect("token should be valid");
        assert_eq!(got, token);
    }

    /// Test that empty storage fails immediately with no refresh attempt.
    #[tokio::test]
    async fn empty_storage_is_unauthenticated() {
        let manager = manager_with("http://127.0.0.1:9/api", MemoryStore::new());
        manager.restore().await;

        assert!(!manager.is_authenticated());
        assert!(matches!(
            manager.valid_token().await,
            Err(Error::Unauthenticated)
        ));
    }

    /// Test that concurrent callers against an expired token trigger exactly
    /// one refresh call and all observe the same new token, whose expiry is
    /// strictly later than the old one's.
    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let old = mint(-60);
        let new = mint(3600);
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(refresh_body(&new, "refresh-2"))
            .expect(1)
            .create_async()
            .await;

        let manager = manager_with(
            &server.url(),
            MemoryStore::with_pair(TokenPair::new(&old, "refresh-1")),
        );
        manager.restore().await;

        let (a, b, c, d) = tokio::join!(
            manager.valid_token(),
            manager.valid_token(),
            manager.valid_token(),
            manager.valid_token()
        );
        m.assert_async().await;

        for result in [a, b, c, d] {
            assert_eq!(result.expect("refresh should succeed"), new);
        }
        let old_exp = decode_unverified(&old).expect("old claims").exp;
        let new_exp = decode_unverified(&new).expect("new claims").exp;
        assert!(new_exp > old_exp);
    }

    /// Test that a successful refresh rotates both stored tokens.
    #[tokio::test]
    async fn refresh_rotates_stored_pair() {
        let old = mint(-1);
        let new = mint(3600);
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(refresh_body(&new, "refresh-2"))
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::with_pair(TokenPair::new(&old, "refresh-1")));
        let manager = SessionManager::new(
            reqwest::Client::new(),
            &ApiConfig::new(server.url()),
            store.clone(),
        );
        manager.restore().await;

        manager.valid_token().await.expect("refresh should succeed");
        let stored = store
            .load()
            .await
            .expect("load should succeed")
            .expect("pair should be stored");
        assert_eq!(stored.access_token, new);
        assert_eq!(stored.refresh_token, "refresh-2");
    }

    /// Test that a rejected refresh ends the session: error, cleared storage,
    /// signed-out stream.
    #[tokio::test]
    async fn rejected_refresh_ends_session() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh-token")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "refresh token expired", "code": "UNAUTHORIZED"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = Arc::new(MemoryStore::with_pair(TokenPair::new(mint(-60), "stale")));
        let manager = SessionManager::new(
            reqwest::Client::new(),
            &ApiConfig::new(server.url()),
            store.clone(),
        );
        manager.restore().await;
        let mut stream = manager.subscribe();

        let (a, b) = tokio::join!(manager.valid_token(), manager.valid_token());
        m.assert_async().await;

        assert!(matches!(a, Err(Error::Unauthenticated)));
        assert!(matches!(b, Err(Error::Unauthenticated)));
        assert!(!manager.is_authenticated());
        assert_eq!(store.load().await.expect("load should succeed"), None);
        assert!(stream.borrow_and_update().is_none());
    }

    /// Test that a second refresh is possible after re-login, i.e. the state
    /// machine returns to idle after settling.
    #[tokio::test]
    async fn refresh_state_settles_back_to_idle() {
        let first = mint(-1);
        let second = mint(-1);
        let third = mint(3600);
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/refresh-token")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "refreshToken": "refresh-1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(refresh_body(&second, "refresh-2"))
            .expect(1)
            .create_async()
            .await;
        let m2 = server
            .mock("POST", "/auth/refresh-token")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "refreshToken": "refresh-2",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(refresh_body(&third, "refresh-3"))
            .expect(1)
            .create_async()
            .await;

        let manager = manager_with(
            &server.url(),
            MemoryStore::with_pair(TokenPair::new(&first, "refresh-1")),
        );
        manager.restore().await;

        // First refresh immediately yields another expired token, so the next
        // call must start a second, separate refresh.
        assert_eq!(
            manager.valid_token().await.expect("first refresh"),
            second
        );
        assert_eq!(manager.valid_token().await.expect("second refresh"), third);
        m.assert_async().await;
        m2.assert_async().await;
    }

    /// Test that login lowercases and trims the email, installs the pair and
    /// publishes the user.
    #[tokio::test]
    async fn login_normalizes_email_and_installs_session() {
        let access = mint(3600);
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/login")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "email": "carla@example.com",
                "password": "hunter2",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"token": "{}", "refreshToken": "refresh-1",
                     "user": {{"_id": "u1", "username": "carla", "email": "carla@example.com"}}}}"#,
                access
            ))
            .create_async()
            .await;

        let manager = manager_with(&server.url(), MemoryStore::new());
        let user = manager
            .login("  Carla@Example.COM ", " hunter2 ")
            .await
            .expect("login should succeed");
        m.assert_async().await;

        assert_eq!(user.username, "carla");
        assert!(manager.is_authenticated());
        assert_eq!(
            manager.current_user().map(|u| u.id),
            Some("u1".to_string())
        );
    }

    /// Test that registration signs the new account straight in.
    #[tokio::test]
    async fn register_signs_the_new_account_in() {
        let access = mint(3600);
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/auth/register")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "name": "Carla",
                "username": "carla",
                "email": "carla@example.com",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"token": "{}", "refreshToken": "refresh-1",
                     "user": {{"_id": "u1", "username": "carla", "email": "carla@example.com"}}}}"#,
                access
            ))
            .create_async()
            .await;

        let manager = manager_with(&server.url(), MemoryStore::new());
        let registration = Registration {
            name: "Carla ".to_string(),
            username: " carla".to_string(),
            email: "Carla@Example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let user = manager
            .register(&registration)
            .await
            .expect("registration should succeed");
        m.assert_async().await;

        assert_eq!(user.id, "u1");
        assert!(manager.is_authenticated());
    }

    /// Test that a 401 login surfaces the server's error body.
    #[tokio::test]
    async fn login_rejection_carries_server_code() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Invalid email or password", "code": "INVALID_CREDENTIALS"}"#)
            .create_async()
            .await;

        let manager = manager_with(&server.url(), MemoryStore::new());
        let err = manager
            .login("carla@example.com", "wrong")
            .await
            .expect_err("login should fail");
        assert_eq!(err.status(), Some(401));
        match err {
            Error::Api { code, .. } => {
                assert_eq!(code.as_deref(), Some("INVALID_CREDENTIALS"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!manager.is_authenticated());
    }

    /// Test that logout clears storage and pushes a signed-out event.
    #[tokio::test]
    async fn logout_clears_everything() {
        let store = Arc::new(MemoryStore::with_pair(TokenPair::new(mint(3600), "r")));
        let manager = SessionManager::new(
            reqwest::Client::new(),
            &ApiConfig::new("http://127.0.0.1:9/api"),
            store.clone(),
        );
        manager.restore().await;
        assert!(manager.is_authenticated());

        manager.logout().await;
        assert!(!manager.is_authenticated());
        assert_eq!(store.load().await.expect("load should succeed"), None);
        assert!(manager.current_user().is_none());
    }

    /// Test that restoring an expired pair clears storage instead of keeping
    /// a half-valid session.
    #[tokio::test]
    async fn restore_discards_expired_pair() {
        let store = Arc::new(MemoryStore::with_pair(TokenPair::new(mint(-3600), "r")));
        let manager = SessionManager::new(
            reqwest::Client::new(),
            &ApiConfig::new("http://127.0.0.1:9/api"),
            store.clone(),
        );
        manager.restore().await;

        assert!(!manager.is_authenticated());
        assert_eq!(store.load().await.expect("load should succeed"), None);
    }
}
