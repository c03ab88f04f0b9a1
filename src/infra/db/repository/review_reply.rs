use super::DbConn;
use crate::domain::ReviewReply;
use anyhow::Result;
use rusqlite::Row;

pub struct ReviewReplyRepository {
    conn: DbConn,
}

impl ReviewReplyRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, reply: &ReviewReply) -> Result<()> {
        let id = reply
            .id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("cannot save review reply without identity"))?;
        let conn = self
            .conn
            .lock()
            .expect("ReviewReplyRepository: failed to acquire database lock");
        conn.execute(
            r#"
            INSERT OR REPLACE INTO review_replies (
                id, review_id, body_top, body_top_rich_text,
                body_bottom, body_bottom_rich_text, public, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            rusqlite::params![
                id,
                reply.review_id,
                reply.body_top,
                reply.body_top_rich_text,
                reply.body_bottom,
                reply.body_bottom_rich_text,
                reply.public,
                reply.created_at,
                reply.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<ReviewReply>> {
        let conn = self
            .conn
            .lock()
            .expect("ReviewReplyRepository: failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, review_id, body_top, body_top_rich_text,
                   body_bottom, body_bottom_rich_text, public, created_at, updated_at
            FROM review_replies
            WHERE id = ?1
            "#,
        )?;

        let mut rows = stmt.query_map([id], Self::row_to_reply)?;
        rows.next().transpose().map_err(Into::into)
    }

    /// Unpublished drafts, oldest first.
    pub fn list_drafts(&self) -> Result<Vec<ReviewReply>> {
        let conn = self
            .conn
            .lock()
            .expect("ReviewReplyRepository: failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, review_id, body_top, body_top_rich_text,
                   body_bottom, body_bottom_rich_text, public, created_at, updated_at
            FROM review_replies
            WHERE public = 0
            ORDER BY created_at
            "#,
        )?;

        let rows = stmt.query_map([], Self::row_to_reply)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .expect("ReviewReplyRepository: failed to acquire database lock");
        let affected = conn.execute("DELETE FROM review_replies WHERE id = ?1", [id])?;
        Ok(affected)
    }

    fn row_to_reply(row: &Row) -> rusqlite::Result<ReviewReply> {
        Ok(ReviewReply {
            id: Some(row.get(0)?),
            review_id: row.get(1)?,
            body_top: row.get(2)?,
            body_top_rich_text: row.get(3)?,
            body_bottom: row.get(4)?,
            body_bottom_rich_text: row.get(5)?,
            public: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}
