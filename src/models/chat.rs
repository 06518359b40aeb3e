use serde::{Deserialize, Serialize};

/// Reply from the recipe-discovery assistant.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatReply {
    pub success: bool,
    pub response: String,
    /// "chat" when the reply is plain text, "recipes" when suggestions carry
    /// the payload.
    #[serde(rename = "type")]
    pub kind: String,
    pub suggestions: Vec<RecipeSuggestion>,
    pub timestamp: Option<String>,
}

/// A compact recipe card the assistant may attach to a reply.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeSuggestion {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub rating: Option<f64>,
}

/// Preferences sent with a meal-plan request.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    pub preferences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u8>,
}
