use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteSubscriptionRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::SubscriptionRepository for SqliteSubscriptionRepository<'conn> {
    fn subscribe(&self, user_id: &str, subreddit_id: &str, subscribed_at: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO subscriptions (user_id, subreddit_id, subscribed_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![user_id, subreddit_id, subscribed_at],
        )?;
        Ok(())
    }

    fn unsubscribe(&self, user_id: &str, subreddit_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM subscriptions WHERE user_id = ?1 AND subreddit_id = ?2",
            params![user_id, subreddit_id],
        )?;
        Ok(())
    }

    fn is_subscribed(&self, user_id: &str, subreddit_id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1 AND subreddit_id = ?2",
            params![user_id, subreddit_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn subreddit_ids_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT subreddit_id FROM subscriptions WHERE user_id = ?1 ORDER BY subscribed_at DESC",
        )?;
        let ids = stmt
            .query_map(params![user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
