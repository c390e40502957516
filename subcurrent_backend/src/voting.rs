//! Vote tallying and cache population.
//!
//! A (voter, post) pair holds at most one vote row. Repeating the same vote
//! removes it, voting the other way flips it in place, and anything else
//! creates it. After a create or flip the post's net score is recomputed and,
//! once it reaches the threshold, a denormalized snapshot of the post is
//! pushed into the cache store.

use crate::auth::AuthUser;
use crate::cache::{CachedPost, PostCache};
use crate::database::models::{PostRecord, UserRecord, VoteDirection, VoteRecord};
use crate::database::repositories::{PostRepository, UserRepository, VoteRepository};
use crate::database::Database;
use crate::utils::now_utc_iso;
use anyhow::Result;

/// Net score at which a post earns a cache snapshot.
pub const CACHE_AFTER_UPVOTES: i64 = 1;

/// What happened to the caller's vote row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Cast,
    Updated,
    Removed,
}

impl VoteOutcome {
    /// Response body for the vote endpoint; clients key UI updates off the
    /// exact wording.
    pub fn message(self) -> &'static str {
        match self {
            VoteOutcome::Cast => "Vote cast",
            VoteOutcome::Updated => "Vote updated",
            VoteOutcome::Removed => "Vote removed",
        }
    }
}

/// Up votes minus down votes.
pub fn net_score(votes: &[VoteRecord]) -> i64 {
    votes
        .iter()
        .map(|vote| match vote.direction {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        })
        .sum()
}

#[derive(Clone)]
pub struct VoteService {
    database: Database,
    cache: PostCache,
}

impl VoteService {
    pub fn new(database: Database, cache: PostCache) -> Self {
        Self { database, cache }
    }

    /// Applies one vote request. Returns `Ok(None)` when the post does not
    /// exist.
    ///
    /// The post, its author, and its vote list are all read before the vote
    /// row changes; the threshold check below runs against that pre-mutation
    /// list, so the just-cast vote is not counted. Duplicate concurrent
    /// requests are left to the (user_id, post_id) primary key.
    pub async fn cast_vote(
        &self,
        voter: &AuthUser,
        post_id: &str,
        direction: VoteDirection,
    ) -> Result<Option<VoteOutcome>> {
        let loaded = self.database.with_repositories(|repos| {
            let Some(post) = repos.posts().get(post_id)? else {
                return Ok(None);
            };
            let author = repos.users().get(&post.author_id)?;
            let votes = repos.votes().list_for_post(post_id)?;
            let existing = repos.votes().get(&voter.id, post_id)?;
            Ok(Some(LoadedPost {
                post,
                author,
                votes,
                existing,
            }))
        })?;
        let Some(loaded) = loaded else {
            return Ok(None);
        };

        let outcome = self
            .database
            .with_repositories(|repos| match &loaded.existing {
                Some(vote) if vote.direction == direction => {
                    repos.votes().delete(&voter.id, post_id)?;
                    Ok(VoteOutcome::Removed)
                }
                Some(_) => {
                    repos
                        .votes()
                        .update_direction(&voter.id, post_id, direction)?;
                    Ok(VoteOutcome::Updated)
                }
                None => {
                    repos.votes().create(&VoteRecord {
                        user_id: voter.id.clone(),
                        post_id: post_id.to_string(),
                        direction,
                        created_at: now_utc_iso(),
                    })?;
                    Ok(VoteOutcome::Cast)
                }
            })?;

        if outcome != VoteOutcome::Removed && net_score(&loaded.votes) >= CACHE_AFTER_UPVOTES {
            let snapshot = CachedPost::from_post(&loaded.post, loaded.author.as_ref(), direction);
            self.cache.store_snapshot(&snapshot).await;
        }

        Ok(Some(outcome))
    }
}

struct LoadedPost {
    post: PostRecord,
    author: Option<UserRecord>,
    votes: Vec<VoteRecord>,
    existing: Option<VoteRecord>,
}
