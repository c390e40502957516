use crate::database::models::SubredditRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteSubredditRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_subreddit_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubredditRecord> {
    Ok(SubredditRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        creator_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl<'conn> super::SubredditRepository for SqliteSubredditRepository<'conn> {
    fn create(&self, record: &SubredditRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO subreddits (id, name, creator_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![record.id, record.name, record.creator_id, record.created_at],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<SubredditRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, creator_id, created_at
                FROM subreddits
                WHERE id = ?1
                "#,
                params![id],
                map_subreddit_row,
            )
            .optional()?)
    }

    fn get_by_name(&self, name: &str) -> Result<Option<SubredditRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, name, creator_id, created_at
                FROM subreddits
                WHERE name = ?1
                "#,
                params![name],
                map_subreddit_row,
            )
            .optional()?)
    }

    fn member_count(&self, subreddit_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM subscriptions WHERE subreddit_id = ?1",
            params![subreddit_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
