use serde::{Deserialize, Serialize};

/// A post on the account's home feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub caption: String,
}

/// A short-form video from the trending surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    #[serde(default)]
    pub author: String,
}

/// A remote account, as returned by the suggestion and following lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// Relationship between our account and a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipStatus {
    pub following: bool,
    #[serde(default)]
    pub followed_by: bool,
}

/// An authenticated gateway session. Cached on disk between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub account_id: String,
}
