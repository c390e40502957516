//! Post snapshot cache.
//!
//! Posts whose net score reaches the threshold get a denormalized copy
//! written into Redis as a flat hash so readers can serve them without
//! touching the relational store. Writes are fire-and-forget: a cache
//! failure never rolls back the relational mutation that preceded it.

use crate::database::models::{PostRecord, UserRecord, VoteDirection};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use serde::Serialize;
use std::time::Duration;

/// Cache key for a post snapshot. The embedded space is part of the
/// established key format; existing readers depend on it.
pub fn snapshot_key(post_id: &str) -> String {
    format!("post: {post_id}")
}

/// Denormalized post copy stored in the cache. `current_vote` records the
/// direction of the vote that triggered the write, not the aggregate
/// direction.
#[derive(Debug, Clone, Serialize)]
pub struct CachedPost {
    pub id: String,
    pub title: String,
    pub author_username: String,
    pub content: String,
    pub current_vote: VoteDirection,
    pub created_at: String,
}

impl CachedPost {
    pub fn from_post(
        post: &PostRecord,
        author: Option<&UserRecord>,
        current_vote: VoteDirection,
    ) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            author_username: author
                .and_then(|user| user.username.clone())
                .unwrap_or_default(),
            content: post.content.clone(),
            current_vote,
            created_at: post.created_at.clone(),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.clone()),
            ("title", self.title.clone()),
            ("author_username", self.author_username.clone()),
            ("content", self.content.clone()),
            ("current_vote", self.current_vote.as_str().to_string()),
            ("created_at", self.created_at.clone()),
        ]
    }
}

/// Handle to the snapshot store. Cheap to clone; holds a managed async
/// connection when configured, otherwise every write is a no-op.
#[derive(Clone)]
pub struct PostCache {
    conn: Option<ConnectionManager>,
}

impl PostCache {
    pub fn disabled() -> Self {
        Self { conn: None }
    }

    /// Connects to Redis, degrading to a disabled cache when the server is
    /// unreachable.
    pub async fn connect(redis_url: &str) -> Self {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(100));

        let client = match redis::Client::open(redis_url) {
            Ok(client) => client,
            Err(err) => {
                tracing::warn!(error = %err, "invalid redis url, snapshot cache disabled");
                return Self::disabled();
            }
        };

        match client.get_connection_manager_with_config(config).await {
            Ok(conn) => Self { conn: Some(conn) },
            Err(err) => {
                tracing::warn!(error = %err, "redis unreachable, snapshot cache disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.conn.is_some()
    }

    /// Upserts a snapshot via a hash-set write. Failures are logged and
    /// swallowed.
    pub async fn store_snapshot(&self, snapshot: &CachedPost) {
        let Some(conn) = &self.conn else {
            tracing::debug!(post_id = %snapshot.id, "snapshot cache disabled, skipping write");
            return;
        };
        let mut conn = conn.clone();
        let key = snapshot_key(&snapshot.id);
        let fields = snapshot.fields();
        let result: redis::RedisResult<()> = conn.hset_multiple(&key, &fields).await;
        if let Err(err) = result {
            tracing::warn!(
                error = %err,
                post_id = %snapshot.id,
                "failed to write post snapshot to cache"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_key_keeps_the_embedded_space() {
        assert_eq!(snapshot_key("abc"), "post: abc");
    }

    #[test]
    fn snapshot_records_the_triggering_direction() {
        let post = PostRecord {
            id: "post-1".into(),
            title: "Title".into(),
            content: "{\"blocks\":[]}".into(),
            author_id: "user-1".into(),
            subreddit_id: "sub-1".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let author = UserRecord {
            id: "user-1".into(),
            username: Some("alice".into()),
        };

        let snapshot = CachedPost::from_post(&post, Some(&author), VoteDirection::Down);
        assert_eq!(snapshot.current_vote, VoteDirection::Down);
        assert_eq!(snapshot.author_username, "alice");

        let fields = snapshot.fields();
        let current = fields
            .iter()
            .find(|(name, _)| *name == "current_vote")
            .unwrap();
        assert_eq!(current.1, "DOWN");
    }

    #[test]
    fn snapshot_username_defaults_to_empty() {
        let post = PostRecord {
            id: "post-1".into(),
            title: "Title".into(),
            content: "{}".into(),
            author_id: "user-1".into(),
            subreddit_id: "sub-1".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let snapshot = CachedPost::from_post(&post, None, VoteDirection::Up);
        assert_eq!(snapshot.author_username, "");
    }

    #[tokio::test]
    async fn disabled_cache_swallows_writes() {
        let cache = PostCache::disabled();
        assert!(!cache.is_enabled());
        let post = PostRecord {
            id: "post-1".into(),
            title: "Title".into(),
            content: "{}".into(),
            author_id: "user-1".into(),
            subreddit_id: "sub-1".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let snapshot = CachedPost::from_post(&post, None, VoteDirection::Up);
        cache.store_snapshot(&snapshot).await;
    }
}
