use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::info;

use super::base::Backend;
use crate::error::Result;
use crate::models::{PasswordResetAck, ProfileUpdate, ResetTokenCheck, User};

/// Account maintenance: password flows, profile updates, deletion.
///
/// Signing in and out lives on [`crate::session::SessionManager`]; this group
/// covers everything else under the auth routes.
pub struct Account {
    backend: Arc<Backend>,
}

impl Account {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Account { backend }
    }

    /// Starts the password-reset flow. Public on purpose: the caller has no
    /// session to speak of.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetAck> {
        let request = self
            .backend
            .public(Method::POST, "/auth/forgot-password")
            .json(&json!({ "email": email.trim().to_lowercase() }));
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Checks a reset token before showing the new-password form.
    pub async fn verify_reset_token(&self, token: &str) -> Result<ResetTokenCheck> {
        let request = self
            .backend
            .public(Method::GET, &format!("/auth/verify-reset-token/{}", token));
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<PasswordResetAck> {
        let request = self
            .backend
            .public(Method::POST, "/auth/reset-password")
            .json(&json!({ "token": token, "newPassword": new_password.trim() }));
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::POST, "/auth/change-password")
            .await?
            .json(&json!({
                "currentPassword": current.trim(),
                "newPassword": new.trim(),
            }));
        self.backend.send(request).await?;
        Ok(())
    }

    /// Updates the account profile and publishes the result on the session
    /// stream.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = self.backend.authed(Method::PUT, "/auth/profile").await?;
        let user: User = self.backend.send(request.json(update)).await?.json().await?;
        self.backend.session().publish_user(user.clone());
        Ok(user)
    }

    /// Deletes the account server-side, then ends the local session.
    pub async fn delete_account(&self) -> Result<()> {
        let request = self.backend.authed(Method::DELETE, "/auth/account").await?;
        self.backend.send(request).await?;
        self.backend.session().logout().await;
        info!("account deleted");
        Ok(())
    }
}
