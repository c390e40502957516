mod comments;
mod posts;
mod sessions;
mod subreddits;
mod subscriptions;
mod users;
mod votes;

use super::models::{
    CommentRecord, PostRecord, SessionRecord, SubredditRecord, UserRecord, VoteDirection,
    VoteRecord,
};
use anyhow::Result;
use rusqlite::Connection;

pub trait UserRepository {
    fn upsert(&self, record: &UserRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UserRecord>>;
}

pub trait SessionRepository {
    fn insert(&self, record: &SessionRecord) -> Result<()>;
    /// Resolves a bearer token to the account it was issued for.
    fn resolve(&self, token: &str) -> Result<Option<UserRecord>>;
    fn delete(&self, token: &str) -> Result<()>;
}

pub trait SubredditRepository {
    fn create(&self, record: &SubredditRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<SubredditRecord>>;
    fn get_by_name(&self, name: &str) -> Result<Option<SubredditRecord>>;
    fn member_count(&self, subreddit_id: &str) -> Result<usize>;
}

pub trait SubscriptionRepository {
    fn subscribe(&self, user_id: &str, subreddit_id: &str, subscribed_at: &str) -> Result<()>;
    fn unsubscribe(&self, user_id: &str, subreddit_id: &str) -> Result<()>;
    fn is_subscribed(&self, user_id: &str, subreddit_id: &str) -> Result<bool>;
    fn subreddit_ids_for_user(&self, user_id: &str) -> Result<Vec<String>>;
}

/// Selection predicate for a feed page.
#[derive(Debug, Clone)]
pub enum PostFilter {
    /// No predicate; every post qualifies.
    Any,
    /// Posts whose subreddit name equals the filter.
    SubredditName(String),
    /// Posts belonging to any of the given subreddit ids. An empty set
    /// matches nothing.
    Subreddits(Vec<String>),
}

pub trait PostRepository {
    fn create(&self, record: &PostRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PostRecord>>;
    /// Returns one feed page: filtered, newest first, `offset` rows skipped,
    /// at most `limit` rows.
    fn list_page(&self, filter: &PostFilter, limit: usize, offset: usize)
        -> Result<Vec<PostRecord>>;
}

pub trait VoteRepository {
    fn get(&self, user_id: &str, post_id: &str) -> Result<Option<VoteRecord>>;
    fn create(&self, record: &VoteRecord) -> Result<()>;
    fn update_direction(
        &self,
        user_id: &str,
        post_id: &str,
        direction: VoteDirection,
    ) -> Result<()>;
    fn delete(&self, user_id: &str, post_id: &str) -> Result<()>;
    fn list_for_post(&self, post_id: &str) -> Result<Vec<VoteRecord>>;
}

pub trait CommentRepository {
    fn create(&self, record: &CommentRecord) -> Result<()>;
    fn list_for_post(&self, post_id: &str) -> Result<Vec<CommentRecord>>;
}

/// Facade handing out rusqlite-backed repository implementations bound to a
/// single borrowed connection.
pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> impl UserRepository + '_ {
        users::SqliteUserRepository { conn: self.conn }
    }

    pub fn sessions(&self) -> impl SessionRepository + '_ {
        sessions::SqliteSessionRepository { conn: self.conn }
    }

    pub fn subreddits(&self) -> impl SubredditRepository + '_ {
        subreddits::SqliteSubredditRepository { conn: self.conn }
    }

    pub fn subscriptions(&self) -> impl SubscriptionRepository + '_ {
        subscriptions::SqliteSubscriptionRepository { conn: self.conn }
    }

    pub fn posts(&self) -> impl PostRepository + '_ {
        posts::SqlitePostRepository { conn: self.conn }
    }

    pub fn votes(&self) -> impl VoteRepository + '_ {
        votes::SqliteVoteRepository { conn: self.conn }
    }

    pub fn comments(&self) -> impl CommentRepository + '_ {
        comments::SqliteCommentRepository { conn: self.conn }
    }

    pub fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MIGRATIONS;

    fn setup_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch(MIGRATIONS).expect("migrations");
        conn
    }

    fn seed_user(repos: &SqliteRepositories<'_>, id: &str, username: &str) {
        repos
            .users()
            .upsert(&UserRecord {
                id: id.into(),
                username: Some(username.into()),
            })
            .unwrap();
    }

    fn seed_subreddit(repos: &SqliteRepositories<'_>, id: &str, name: &str) {
        repos
            .subreddits()
            .create(&SubredditRecord {
                id: id.into(),
                name: name.into(),
                creator_id: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            })
            .unwrap();
    }

    fn seed_post(repos: &SqliteRepositories<'_>, id: &str, subreddit_id: &str, created_at: &str) {
        repos
            .posts()
            .create(&PostRecord {
                id: id.into(),
                title: format!("post {id}"),
                content: "{\"blocks\":[]}".into(),
                author_id: "user-1".into(),
                subreddit_id: subreddit_id.into(),
                created_at: created_at.into(),
            })
            .unwrap();
    }

    #[test]
    fn session_resolution_joins_users() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        seed_user(&repos, "user-1", "alice");

        repos
            .sessions()
            .insert(&SessionRecord {
                token: "token-1".into(),
                user_id: "user-1".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            })
            .unwrap();

        let resolved = repos.sessions().resolve("token-1").unwrap().unwrap();
        assert_eq!(resolved.id, "user-1");
        assert_eq!(resolved.username.as_deref(), Some("alice"));

        assert!(repos.sessions().resolve("token-2").unwrap().is_none());

        repos.sessions().delete("token-1").unwrap();
        assert!(repos.sessions().resolve("token-1").unwrap().is_none());
    }

    #[test]
    fn subscriptions_are_idempotent_and_listable() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        seed_user(&repos, "user-1", "alice");
        seed_subreddit(&repos, "sub-1", "rust");
        seed_subreddit(&repos, "sub-2", "programming");

        let subs = repos.subscriptions();
        subs.subscribe("user-1", "sub-1", "2024-01-01T00:00:00Z")
            .unwrap();
        subs.subscribe("user-1", "sub-1", "2024-01-02T00:00:00Z")
            .unwrap();
        subs.subscribe("user-1", "sub-2", "2024-01-03T00:00:00Z")
            .unwrap();

        assert!(subs.is_subscribed("user-1", "sub-1").unwrap());
        let mut ids = subs.subreddit_ids_for_user("user-1").unwrap();
        ids.sort();
        assert_eq!(ids, vec!["sub-1".to_string(), "sub-2".to_string()]);
        assert_eq!(repos.subreddits().member_count("sub-1").unwrap(), 1);

        subs.unsubscribe("user-1", "sub-1").unwrap();
        assert!(!subs.is_subscribed("user-1", "sub-1").unwrap());
    }

    #[test]
    fn vote_rows_are_unique_per_user_and_post() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        seed_user(&repos, "user-1", "alice");
        seed_subreddit(&repos, "sub-1", "rust");
        seed_post(&repos, "post-1", "sub-1", "2024-01-01T00:00:00Z");

        let votes = repos.votes();
        votes
            .create(&VoteRecord {
                user_id: "user-1".into(),
                post_id: "post-1".into(),
                direction: VoteDirection::Up,
                created_at: "2024-01-01T00:00:01Z".into(),
            })
            .unwrap();

        // duplicate insert trips the primary key
        let duplicate = votes.create(&VoteRecord {
            user_id: "user-1".into(),
            post_id: "post-1".into(),
            direction: VoteDirection::Down,
            created_at: "2024-01-01T00:00:02Z".into(),
        });
        assert!(duplicate.is_err());

        votes
            .update_direction("user-1", "post-1", VoteDirection::Down)
            .unwrap();
        let stored = votes.get("user-1", "post-1").unwrap().unwrap();
        assert_eq!(stored.direction, VoteDirection::Down);

        votes.delete("user-1", "post-1").unwrap();
        assert!(votes.get("user-1", "post-1").unwrap().is_none());
    }

    #[test]
    fn feed_pages_respect_filter_order_and_bounds() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        seed_user(&repos, "user-1", "alice");
        seed_subreddit(&repos, "sub-1", "rust");
        seed_subreddit(&repos, "sub-2", "programming");
        seed_post(&repos, "post-1", "sub-1", "2024-01-01T00:00:00Z");
        seed_post(&repos, "post-2", "sub-2", "2024-01-02T00:00:00Z");
        seed_post(&repos, "post-3", "sub-1", "2024-01-03T00:00:00Z");

        let posts = repos.posts();

        let all = posts.list_page(&PostFilter::Any, 10, 0).unwrap();
        assert_eq!(
            all.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["post-3", "post-2", "post-1"]
        );

        let second_page = posts.list_page(&PostFilter::Any, 2, 2).unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, "post-1");

        let by_name = posts
            .list_page(&PostFilter::SubredditName("rust".into()), 10, 0)
            .unwrap();
        assert_eq!(
            by_name.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["post-3", "post-1"]
        );

        let by_ids = posts
            .list_page(&PostFilter::Subreddits(vec!["sub-2".into()]), 10, 0)
            .unwrap();
        assert_eq!(by_ids.len(), 1);
        assert_eq!(by_ids[0].id, "post-2");

        // subscribed to nothing means an empty feed, not a full scan
        let none = posts
            .list_page(&PostFilter::Subreddits(Vec::new()), 10, 0)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn comments_attach_to_posts() {
        let conn = setup_conn();
        let repos = SqliteRepositories::new(&conn);
        seed_user(&repos, "user-1", "alice");
        seed_subreddit(&repos, "sub-1", "rust");
        seed_post(&repos, "post-1", "sub-1", "2024-01-01T00:00:00Z");

        repos
            .comments()
            .create(&CommentRecord {
                id: "comment-1".into(),
                post_id: "post-1".into(),
                author_id: "user-1".into(),
                body: "nice".into(),
                created_at: "2024-01-01T00:01:00Z".into(),
            })
            .unwrap();

        let comments = repos.comments().list_for_post("post-1").unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "nice");
    }
}
