use crate::database::models::{VoteDirection, VoteRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteVoteRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_vote_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VoteRecord> {
    let raw: String = row.get(2)?;
    let direction = VoteDirection::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown vote direction {raw}").into(),
        )
    })?;
    Ok(VoteRecord {
        user_id: row.get(0)?,
        post_id: row.get(1)?,
        direction,
        created_at: row.get(3)?,
    })
}

impl<'conn> super::VoteRepository for SqliteVoteRepository<'conn> {
    fn get(&self, user_id: &str, post_id: &str) -> Result<Option<VoteRecord>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT user_id, post_id, vote_type, created_at
                FROM votes
                WHERE user_id = ?1 AND post_id = ?2
                "#,
                params![user_id, post_id],
                map_vote_row,
            )
            .optional()?)
    }

    fn create(&self, record: &VoteRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO votes (user_id, post_id, vote_type, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                record.user_id,
                record.post_id,
                record.direction.as_str(),
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn update_direction(
        &self,
        user_id: &str,
        post_id: &str,
        direction: VoteDirection,
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE votes SET vote_type = ?3 WHERE user_id = ?1 AND post_id = ?2",
            params![user_id, post_id, direction.as_str()],
        )?;
        Ok(())
    }

    fn delete(&self, user_id: &str, post_id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM votes WHERE user_id = ?1 AND post_id = ?2",
            params![user_id, post_id],
        )?;
        Ok(())
    }

    fn list_for_post(&self, post_id: &str) -> Result<Vec<VoteRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT user_id, post_id, vote_type, created_at
            FROM votes
            WHERE post_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![post_id], map_vote_row)?;
        let mut votes = Vec::new();
        for row in rows {
            votes.push(row?);
        }
        Ok(votes)
    }
}
