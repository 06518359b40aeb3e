use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};

use crate::error::{Error, Result};
use crate::session::SessionManager;

/// Shared plumbing for the endpoint groups: the HTTP pool, the API base URL,
/// and the session mediator that hands out bearer credentials.
pub(crate) struct Backend {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl Backend {
    pub fn new(http: reqwest::Client, base_url: String, session: Arc<SessionManager>) -> Self {
        Backend {
            http,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A request that needs no credentials.
    pub fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// A request carrying a bearer credential obtained through the session
    /// mediator. Suspends across an in-flight refresh; when the mediator
    /// reports `Unauthenticated` the request is never dispatched and the
    /// pending action is abandoned.
    pub async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.session.valid_token().await?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    /// Dispatches a request and maps non-success statuses to [`Error::Api`].
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::from_response(response).await);
        }
        Ok(response)
    }
}
