use serde::{Deserialize, Serialize};

/// Direction of a post vote. Stored as `UP` / `DOWN` text, which is also the
/// wire form accepted by the vote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Up => "UP",
            VoteDirection::Down => "DOWN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "UP" => Some(VoteDirection::Up),
            "DOWN" => Some(VoteDirection::Down),
            _ => None,
        }
    }
}

/// Account row. Accounts are created by the auth collaborator; this backend
/// only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: Option<String>,
}

/// Bearer session issued by the auth collaborator and resolved here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubredditRecord {
    pub id: String,
    pub name: String,
    pub creator_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub user_id: String,
    pub subreddit_id: String,
    pub subscribed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    /// Serialized editor-block document. Opaque to the backend, stored as
    /// JSON text and parsed only when a view is assembled.
    pub content: String,
    pub author_id: String,
    pub subreddit_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
    pub user_id: String,
    pub post_id: String,
    pub direction: VoteDirection,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}
