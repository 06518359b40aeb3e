use std::sync::Arc;

use reqwest::Method;
use serde_json::json;

use super::base::Backend;
use crate::error::Result;
use crate::models::{ChatReply, MealPlanRequest};

/// The recipe-discovery assistant.
pub struct Chat {
    backend: Arc<Backend>,
}

impl Chat {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        Chat { backend }
    }

    /// Sends one user message. `voice_mode` asks the assistant for a reply
    /// phrased for speech output.
    pub async fn send(&self, message: &str, voice_mode: bool) -> Result<ChatReply> {
        let request = self
            .backend
            .authed(Method::POST, "/chatbot/chat")
            .await?
            .json(&json!({ "message": message, "voiceMode": voice_mode }));
        Ok(self.backend.send(request).await?.json().await?)
    }

    /// Asks the assistant for a meal plan built from the given preferences.
    pub async fn meal_plan(&self, request: &MealPlanRequest) -> Result<ChatReply> {
        let http_request = self
            .backend
            .authed(Method::POST, "/chatbot/meal-plan")
            .await?
            .json(request);
        Ok(self.backend.send(http_request).await?.json().await?)
    }
}
