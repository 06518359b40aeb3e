use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A platform user as returned by the profile and auth endpoints.
///
/// The wire format is loose: almost everything beyond the identifiers can be
/// absent, so optional fields default rather than fail deserialization.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub cover_picture: Option<String>,
    pub tagline: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub cooking_style: Option<String>,
    pub social_media: HashMap<String, String>,
    pub interests: Vec<String>,
    pub specialties: Vec<String>,
    pub recipes_count: u64,
    pub saved_recipes_count: u64,
    pub favorites_count: u64,
    pub reviews_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub total_likes: u64,
    pub total_views: u64,
    pub member_since: Option<String>,
    pub last_active: Option<String>,
    pub is_verified: bool,
    pub is_pro_chef: bool,
    pub favorites: Vec<String>,
    pub saved_recipes: Vec<String>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub badges: Vec<Badge>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// "local" or "google".
    pub provider: Option<String>,
    pub email_verified: bool,
}

/// An achievement badge shown on a profile.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Badge {
    pub name: String,
    pub icon: String,
    pub earned_at: String,
    pub description: String,
}

/// A featured author in the chefs directory.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Chef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub specialty: Option<String>,
    pub recipes_count: u64,
    pub followers_count: u64,
    pub is_verified: bool,
    pub created_at: Option<String>,
}

/// What the login and register endpoints return: the token pair plus the
/// authenticated user's profile.
#[derive(Deserialize, Clone, Debug)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub user: User,
}

/// Aggregate profile statistics.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileStats {
    pub recipes_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    pub total_likes: u64,
    pub total_views: u64,
    pub engagement_rate: f64,
}

/// Follow toggle outcome.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FollowStatus {
    pub following: bool,
    pub followers_count: u64,
}

/// An author page: the profile plus their published recipes.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct AuthorProfile {
    pub user: User,
    pub recipes: Vec<crate::models::recipe::Recipe>,
}

/// Acknowledgement from the password-reset endpoints.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct PasswordResetAck {
    pub message: String,
}

/// Result of checking a password-reset token before showing the form.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ResetTokenCheck {
    pub valid: bool,
    pub message: Option<String>,
}

/// Fields a user may change on their own profile. Only set fields are sent.
#[derive(Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that a sparse user document deserializes with defaults.
    #[test]
    fn sparse_user_deserializes() {
        let json = r#"{"_id": "u1", "username": "carla", "email": "carla@example.com"}"#;
        let user: User = serde_json::from_str(json).expect("user should deserialize");
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "carla");
        assert!(user.interests.is_empty());
        assert!(!user.is_pro_chef);
    }

    /// Test that a profile update only serializes the fields that were set.
    #[test]
    fn profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("Pastry first".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).expect("update should serialize");
        assert_eq!(json, serde_json::json!({"bio": "Pastry first"}));
    }
}
