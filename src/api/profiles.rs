use std::sync::Arc;

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::base::Backend;
use crate::error::Result;
use crate::models::{
    AuthorProfile, Badge, Chef, FollowStatus, ProfileStats, ProfileUpdate, Recipe, User,
};

/// Profile pages, the chefs directory, and the social graph.
pub struct Profiles {
    backend: Arc<Backend>,
}

impl Profiles {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Profiles { backend }
    }

    /// The signed-in user's own profile. The fetched profile is also
    /// published on the session stream so observers see the hydrated fields.
    pub async fn me(&self) -> Result<User> {
        let request = self.backend.authed(Method::GET, "/profile/").await?;
        let user: User = self.backend.send(request).await?.json().await?;
        self.backend.session().publish_user(user.clone());
        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<User> {
        let request = self
            .backend
            .authed(Method::GET, &format!("/profile/{}", user_id))
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// An author page: profile plus published recipes.
    pub async fn author(&self, user_id: &str) -> Result<AuthorProfile> {
        let request = self
            .backend
            .authed(Method::GET, &format!("/profile/author/{}", user_id))
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// The public chefs directory.
    pub async fn chefs(&self) -> Result<Vec<Chef>> {
        #[derive(Deserialize)]
        struct ChefsResponse {
            users: Vec<Chef>,
        }

        let request = self.backend.public(Method::GET, "/profile/chefs");
        let body: ChefsResponse = self.backend.send(request).await?.json().await?;
        Ok(body.users)
    }

    /// Toggles following the given user and reports the resulting state.
    pub async fn follow(&self, user_id: &str) -> Result<FollowStatus> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/profile/follow/{}", user_id))
            .await?;
        Ok(self
            .backend
            .send(request.json(&json!({})))
            .await?
            .json()
            .await?)
    }

    /// Who a user follows; the signed-in user when `user_id` is `None`.
    pub async fn following(&self, user_id: Option<&str>) -> Result<Vec<User>> {
        #[derive(Deserialize)]
        struct FollowingResponse {
            following: Vec<User>,
        }

        let path = match user_id {
            Some(id) => format!("/profile/following/{}", id),
            None => "/profile/following".to_string(),
        };
        let request = self.backend.authed(Method::GET, &path).await?;
        let body: FollowingResponse = self.backend.send(request).await?.json().await?;
        Ok(body.following)
    }

    /// Who follows a user; the signed-in user when `user_id` is `None`.
    pub async fn followers(&self, user_id: Option<&str>) -> Result<Vec<User>> {
        #[derive(Deserialize)]
        struct FollowersResponse {
            followers: Vec<User>,
        }

        let path = match user_id {
            Some(id) => format!("/profile/followers/{}", id),
            None => "/profile/followers".to_string(),
        };
        let request = self.backend.authed(Method::GET, &path).await?;
        let body: FollowersResponse = self.backend.send(request).await?.json().await?;
        Ok(body.followers)
    }

    pub async fn saved_recipes(&self) -> Result<Vec<Recipe>> {
        let request = self
            .backend
            .authed(Method::GET, "/profile/saved-recipes")
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn favorite_recipes(&self) -> Result<Vec<Recipe>> {
        let request = self
            .backend
            .authed(Method::GET, "/profile/favorite-recipes")
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Aggregate statistics; the signed-in user when `user_id` is `None`.
    pub async fn stats(&self, user_id: Option<&str>) -> Result<ProfileStats> {
        let path = match user_id {
            Some(id) => format!("/profile/stats/{}", id),
            None => "/profile/stats".to_string(),
        };
        let request = self.backend.authed(Method::GET, &path).await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Earned badges; the signed-in user when `user_id` is `None`.
    pub async fn badges(&self, user_id: Option<&str>) -> Result<Vec<Badge>> {
        #[derive(Deserialize)]
        struct BadgesResponse {
            badges: Vec<Badge>,
        }

        let path = match user_id {
            Some(id) => format!("/profile/badges/{}", id),
            None => "/profile/badges".to_string(),
        };
        let request = self.backend.authed(Method::GET, &path).await?;
        let body: BadgesResponse = self.backend.send(request).await?.json().await?;
        Ok(body.badges)
    }

    /// A user's published recipes, visible without signing in.
    pub async fn recipes_of(&self, user_id: &str) -> Result<Vec<Recipe>> {
        let request = self
            .backend
            .public(Method::GET, &format!("/profile/{}/recipes", user_id));
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Updates profile settings and publishes the merged profile.
    pub async fn update_settings(&self, update: &ProfileUpdate) -> Result<User> {
        let request = self.backend.authed(Method::PUT, "/profile").await?;
        let user: User = self.backend.send(request.json(update)).await?.json().await?;
        self.backend.session().publish_user(user.clone());
        Ok(user)
    }
}
