use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::base::Backend;
use crate::error::Result;
use crate::models::{Recipe, RecipeDraft, RecipePage, Review, ReviewDraft, ShareLink};

/// Recipe browsing and authoring.
///
/// Listing and detail endpoints are public; everything that writes, and the
/// personal favorites/saved lists, go through the session mediator.
pub struct Recipes {
    backend: Arc<Backend>,
}

impl Recipes {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Recipes { backend }
    }

    /// One page of the public recipe feed.
    pub async fn list(&self, page: u32, limit: u32) -> Result<RecipePage> {
        let request = self
            .backend
            .public(Method::GET, "/recipes")
            .query(&[("page", page), ("limit", limit)]);
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Recipes in a category, first page ordering as the server sees fit.
    pub async fn by_category(&self, category: &str) -> Result<RecipePage> {
        let request = self
            .backend
            .public(Method::GET, "/recipes")
            .query(&[("category", category)]);
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Full-text search over titles and ingredients.
    pub async fn search(&self, query: &str) -> Result<RecipePage> {
        let request = self
            .backend
            .public(Method::GET, "/recipes/search")
            .query(&[("q", query)]);
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Recipe> {
        let request = self
            .backend
            .public(Method::GET, &format!("/recipes/{}", id));
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe> {
        let request = self.backend.authed(Method::POST, "/recipes").await?;
        let recipe: Recipe = self
            .backend
            .send(request.json(draft))
            .await?
            .json()
            .await?;
        debug!(recipe = %recipe.id, "recipe created");
        Ok(recipe)
    }

    pub async fn update(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe> {
        let request = self
            .backend
            .authed(Method::PUT, &format!("/recipes/{}", id))
            .await?;
        Ok(self.backend.send(request.json(draft)).await?.json().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::DELETE, &format!("/recipes/{}", id))
            .await?;
        self.backend.send(request).await?;
        Ok(())
    }

    /// The signed-in user's own recipes.
    pub async fn mine(&self) -> Result<RecipePage> {
        let request = self.backend.authed(Method::GET, "/recipes/user/me").await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Another user's published recipes.
    pub async fn by_user(&self, user_id: &str) -> Result<RecipePage> {
        let request = self
            .backend
            .authed(Method::GET, &format!("/recipes/user/{}", user_id))
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn favorite(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/recipes/{}/favorite", id))
            .await?;
        self.backend.send(request.json(&json!({}))).await?;
        Ok(())
    }

    pub async fn unfavorite(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::DELETE, &format!("/recipes/{}/favorite", id))
            .await?;
        self.backend.send(request).await?;
        Ok(())
    }

    pub async fn save(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/recipes/{}/save", id))
            .await?;
        self.backend.send(request.json(&json!({}))).await?;
        Ok(())
    }

    pub async fn unsave(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::DELETE, &format!("/recipes/{}/save", id))
            .await?;
        self.backend.send(request).await?;
        Ok(())
    }

    /// The signed-in user's favorites.
    pub async fn favorites(&self) -> Result<RecipePage> {
        let request = self
            .backend
            .authed(Method::GET, "/recipes/favorites/me")
            .await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// The signed-in user's saved-for-later list.
    pub async fn saved(&self) -> Result<RecipePage> {
        let request = self.backend.authed(Method::GET, "/recipes/saved/me").await?;
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Reviews are public to read.
    pub async fn reviews(&self, recipe_id: &str) -> Result<Vec<Review>> {
        let request = self
            .backend
            .public(Method::GET, &format!("/recipes/{}/reviews", recipe_id));
        Ok(self.backend.send(request).await?.json().await?)
    }

    pub async fn add_review(&self, recipe_id: &str, review: &ReviewDraft) -> Result<Review> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/recipes/{}/reviews", recipe_id))
            .await?;
        Ok(self.backend.send(request.json(review)).await?.json().await?)
    }

    pub async fn delete_review(&self, recipe_id: &str, review_id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(
                Method::DELETE,
                &format!("/recipes/{}/reviews/{}", recipe_id, review_id),
            )
            .await?;
        self.backend.send(request).await?;
        Ok(())
    }

    pub async fn report(&self, recipe_id: &str, reason: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/recipes/{}/report", recipe_id))
            .await?;
        self.backend
            .send(request.json(&json!({ "reason": reason })))
            .await?;
        Ok(())
    }

    /// Asks the server for a share URL for the given platform.
    pub async fn share(&self, recipe_id: &str, platform: &str) -> Result<ShareLink> {
        let request = self
            .backend
            .authed(Method::POST, &format!("/recipes/{}/share", recipe_id))
            .await?;
        Ok(self
            .backend
            .send(request.json(&json!({ "platform": platform })))
            .await?
            .json()
            .await?)
    }
}
