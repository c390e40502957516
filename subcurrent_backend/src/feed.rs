//! Feed assembly.
//!
//! Builds an ordered page of hydrated posts: filtered by community name when
//! a filter is given, otherwise by the viewer's subscriptions when a viewer
//! is known, otherwise unfiltered.

use crate::database::models::{CommentRecord, UserRecord, VoteRecord};
use crate::database::repositories::{
    CommentRepository, PostFilter, PostRepository, SqliteRepositories, SubredditRepository,
    SubscriptionRepository, UserRepository, VoteRepository,
};
use crate::database::Database;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Clone)]
pub struct FeedService {
    database: Database,
}

/// Validated feed parameters. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub limit: usize,
    pub page: usize,
    pub subreddit_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubredditView {
    pub id: String,
    pub name: String,
    pub creator_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteView {
    pub user_id: String,
    pub direction: crate::database::models::VoteDirection,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub content: serde_json::Value,
    pub created_at: String,
    pub author: UserView,
    pub subreddit: SubredditView,
    pub votes: Vec<VoteView>,
    pub comments: Vec<CommentView>,
}

impl FeedService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Returns one feed page for the given query and viewer. The community
    /// filter wins over the viewer's subscriptions; an anonymous, unfiltered
    /// request scans every post.
    pub fn assemble(&self, query: &FeedQuery, viewer: Option<&str>) -> Result<Vec<PostView>> {
        let filter = if let Some(name) = &query.subreddit_name {
            PostFilter::SubredditName(name.clone())
        } else if let Some(user_id) = viewer {
            let subscribed = self
                .database
                .with_repositories(|repos| repos.subscriptions().subreddit_ids_for_user(user_id))?;
            PostFilter::Subreddits(subscribed)
        } else {
            PostFilter::Any
        };

        let offset = (query.page - 1).saturating_mul(query.limit);
        self.database.with_repositories(|repos| {
            let posts = repos.posts().list_page(&filter, query.limit, offset)?;
            let mut views = Vec::with_capacity(posts.len());
            for post in posts {
                views.push(hydrate_post(&repos, post)?);
            }
            Ok(views)
        })
    }
}

fn hydrate_post(
    repos: &SqliteRepositories<'_>,
    post: crate::database::models::PostRecord,
) -> Result<PostView> {
    let votes = repos.votes().list_for_post(&post.id)?;
    let comments = repos.comments().list_for_post(&post.id)?;
    let author = repos
        .users()
        .get(&post.author_id)?
        .with_context(|| format!("author {} missing for post {}", post.author_id, post.id))?;
    let subreddit = repos
        .subreddits()
        .get(&post.subreddit_id)?
        .with_context(|| format!("subreddit {} missing for post {}", post.subreddit_id, post.id))?;
    let content = serde_json::from_str(&post.content)
        .with_context(|| format!("stored content for post {} is not valid JSON", post.id))?;

    Ok(PostView {
        id: post.id,
        title: post.title,
        content,
        created_at: post.created_at,
        author: map_user(author),
        subreddit: SubredditView {
            id: subreddit.id,
            name: subreddit.name,
            creator_id: subreddit.creator_id,
            created_at: subreddit.created_at,
        },
        votes: votes.into_iter().map(map_vote).collect(),
        comments: comments.into_iter().map(map_comment).collect(),
    })
}

fn map_user(user: UserRecord) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
    }
}

fn map_vote(vote: VoteRecord) -> VoteView {
    VoteView {
        user_id: vote.user_id,
        direction: vote.direction,
    }
}

fn map_comment(comment: CommentRecord) -> CommentView {
    CommentView {
        id: comment.id,
        author_id: comment.author_id,
        body: comment.body,
        created_at: comment.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        PostRecord, SubredditRecord, UserRecord, VoteDirection, VoteRecord,
    };
    use rusqlite::Connection;

    fn setup_database() -> Database {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let database = Database::from_connection(conn, true);
        database.ensure_migrations().expect("migrations");
        database
    }

    fn seed_world(database: &Database) {
        database
            .with_repositories(|repos| {
                repos.users().upsert(&UserRecord {
                    id: "user-1".into(),
                    username: Some("alice".into()),
                })?;
                repos.users().upsert(&UserRecord {
                    id: "user-2".into(),
                    username: Some("bob".into()),
                })?;
                for (id, name) in [("sub-1", "rust"), ("sub-2", "programming")] {
                    repos.subreddits().create(&SubredditRecord {
                        id: id.into(),
                        name: name.into(),
                        creator_id: Some("user-1".into()),
                        created_at: "2024-01-01T00:00:00Z".into(),
                    })?;
                }
                for (id, sub, ts) in [
                    ("post-1", "sub-1", "2024-01-01T10:00:00Z"),
                    ("post-2", "sub-2", "2024-01-02T10:00:00Z"),
                    ("post-3", "sub-1", "2024-01-03T10:00:00Z"),
                ] {
                    repos.posts().create(&PostRecord {
                        id: id.into(),
                        title: format!("title {id}"),
                        content: "{\"blocks\":[]}".into(),
                        author_id: "user-1".into(),
                        subreddit_id: sub.into(),
                        created_at: ts.into(),
                    })?;
                }
                repos.subscriptions().subscribe(
                    "user-2",
                    "sub-1",
                    "2024-01-01T00:00:00Z",
                )?;
                Ok(())
            })
            .expect("seed");
    }

    fn query(limit: usize, page: usize, name: Option<&str>) -> FeedQuery {
        FeedQuery {
            limit,
            page,
            subreddit_name: name.map(Into::into),
        }
    }

    #[test]
    fn pages_are_bounded_and_newest_first() {
        let database = setup_database();
        seed_world(&database);
        let service = FeedService::new(database);

        let page = service.assemble(&query(2, 1, None), None).expect("feed");
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "post-3");
        assert_eq!(page[1].id, "post-2");
        assert!(page[0].created_at >= page[1].created_at);

        let second = service.assemble(&query(2, 2, None), None).expect("feed");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, "post-1");
    }

    #[test]
    fn community_filter_wins_over_identity() {
        let database = setup_database();
        seed_world(&database);
        let service = FeedService::new(database);

        // user-2 is subscribed to sub-1 only, but asks for programming
        let page = service
            .assemble(&query(10, 1, Some("programming")), Some("user-2"))
            .expect("feed");
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].subreddit.name, "programming");
    }

    #[test]
    fn authenticated_feed_is_subscription_gated() {
        let database = setup_database();
        seed_world(&database);
        let service = FeedService::new(database);

        let page = service
            .assemble(&query(10, 1, None), Some("user-2"))
            .expect("feed");
        assert_eq!(
            page.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["post-3", "post-1"]
        );

        // no subscriptions at all yields an empty feed
        let empty = service
            .assemble(&query(10, 1, None), Some("user-1"))
            .expect("feed");
        assert!(empty.is_empty());
    }

    #[test]
    fn posts_are_hydrated_with_votes_and_author() {
        let database = setup_database();
        seed_world(&database);
        database
            .with_repositories(|repos| {
                repos.votes().create(&VoteRecord {
                    user_id: "user-2".into(),
                    post_id: "post-3".into(),
                    direction: VoteDirection::Up,
                    created_at: "2024-01-03T11:00:00Z".into(),
                })
            })
            .expect("vote");
        let service = FeedService::new(database);

        let page = service
            .assemble(&query(1, 1, Some("rust")), None)
            .expect("feed");
        assert_eq!(page.len(), 1);
        let post = &page[0];
        assert_eq!(post.author.username.as_deref(), Some("alice"));
        assert_eq!(post.subreddit.name, "rust");
        assert_eq!(post.votes.len(), 1);
        assert_eq!(post.votes[0].direction, VoteDirection::Up);
        assert!(post.comments.is_empty());
        assert!(post.content.is_object());
    }
}
