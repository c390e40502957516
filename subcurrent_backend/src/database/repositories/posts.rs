use super::PostFilter;
use crate::database::models::PostRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, ToSql};

pub(super) struct SqlitePostRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        author_id: row.get(3)?,
        subreddit_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl<'conn> super::PostRepository for SqlitePostRepository<'conn> {
    fn create(&self, record: &PostRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO posts (id, title, content, author_id, subreddit_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.title,
                record.content,
                record.author_id,
                record.subreddit_id,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PostRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, title, content, author_id, subreddit_id, created_at
                FROM posts
                WHERE id = ?1
                "#,
                params![id],
                map_post_row,
            )
            .optional()?)
    }

    fn list_page(
        &self,
        filter: &PostFilter,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PostRecord>> {
        // RFC 3339 UTC timestamps sort chronologically as text.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = match filter {
            PostFilter::Any => {
                let mut stmt = self.conn.prepare(
                    r#"
                    SELECT id, title, content, author_id, subreddit_id, created_at
                    FROM posts
                    ORDER BY created_at DESC
                    LIMIT ?1 OFFSET ?2
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![limit, offset], map_post_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            PostFilter::SubredditName(name) => {
                let mut stmt = self.conn.prepare(
                    r#"
                    SELECT p.id, p.title, p.content, p.author_id, p.subreddit_id, p.created_at
                    FROM posts p
                    INNER JOIN subreddits s ON p.subreddit_id = s.id
                    WHERE s.name = ?1
                    ORDER BY p.created_at DESC
                    LIMIT ?2 OFFSET ?3
                    "#,
                )?;
                let rows = stmt
                    .query_map(params![name, limit, offset], map_post_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            PostFilter::Subreddits(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders = vec!["?"; ids.len()].join(", ");
                let sql = format!(
                    r#"
                    SELECT id, title, content, author_id, subreddit_id, created_at
                    FROM posts
                    WHERE subreddit_id IN ({placeholders})
                    ORDER BY created_at DESC
                    LIMIT ?{limit_idx} OFFSET ?{offset_idx}
                    "#,
                    limit_idx = ids.len() + 1,
                    offset_idx = ids.len() + 2,
                );
                let mut bound: Vec<&dyn ToSql> = Vec::with_capacity(ids.len() + 2);
                for id in ids {
                    bound.push(id);
                }
                bound.push(&limit);
                bound.push(&offset);

                let mut stmt = self.conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(bound.as_slice(), map_post_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }
}
