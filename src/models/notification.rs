use serde::{Deserialize, Serialize};

/// A notification delivered to the current user.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: String,
    /// e.g. "follow", "review", "favorite".
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: Option<String>,
    pub sender: Option<NotificationActor>,
    pub recipe: Option<NotificationRecipe>,
}

/// The user who caused a notification.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationActor {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
}

/// The recipe a notification refers to, if any.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationRecipe {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
}

/// One page of notifications plus the server's unread tally.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub pagination: Pagination,
    pub unread_count: u64,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}
