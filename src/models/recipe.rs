use serde::{Deserialize, Serialize};

use super::user::User;

/// A recipe document. Optional fields mirror the wire format, which omits
/// anything the author never filled in.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    /// "Easy", "Medium" or "Hard".
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<User>,
    pub rating: Option<f64>,
    pub review_count: u64,
    pub likes_count: u64,
    pub is_favorite: bool,
    pub is_saved: bool,
    pub nutrition: Option<Nutrition>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub is_published: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Instruction {
    pub text: String,
    pub image_url: Option<String>,
    pub step_number: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Nutrition {
    pub calories: Option<String>,
    pub protein: Option<String>,
    pub carbs: Option<String>,
    pub fat: Option<String>,
    pub fiber: Option<String>,
    pub sugar: Option<String>,
}

/// A rating with an optional comment, attached to a recipe.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub rating: u8,
    pub comment: String,
    pub author: Option<User>,
    pub recipe_id: Option<String>,
    pub created_at: Option<String>,
}

/// Body for creating or replacing a recipe. The server assigns ids, author
/// and aggregates.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    pub prep_time: u32,
    pub cook_time: u32,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body for rating a recipe.
#[derive(Serialize, Clone, Debug)]
pub struct ReviewDraft {
    pub rating: u8,
    pub comment: String,
}

/// One page of recipes from a listing endpoint.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
}

/// A share link minted by the server for a social platform.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ShareLink {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that a minimal recipe document deserializes with defaults.
    #[test]
    fn sparse_recipe_deserializes() {
        let json = r#"{"_id": "r1", "title": "Shakshuka", "prepTime": 10, "cookTime": 20}"#;
        let recipe: Recipe = serde_json::from_str(json).expect("recipe should deserialize");
        assert_eq!(recipe.title, "Shakshuka");
        assert_eq!(recipe.prep_time, 10);
        assert!(recipe.ingredients.is_empty());
        assert!(!recipe.is_favorite);
    }

    /// Test that a draft omits empty optional sections.
    #[test]
    fn draft_omits_empty_sections() {
        let draft = RecipeDraft {
            title: "Bread".to_string(),
            servings: 4,
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).expect("draft should serialize");
        assert!(json.get("tags").is_none());
        assert!(json.get("description").is_none());
        assert_eq!(json["title"], "Bread");
    }
}
