use super::DbConn;
use crate::domain::{CommentReply, CommentReplyKind, TextType};
use anyhow::Result;
use rusqlite::Row;
use std::str::FromStr;

pub struct CommentReplyRepository {
    conn: DbConn,
}

impl CommentReplyRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, reply: &CommentReply) -> Result<()> {
        let id = reply
            .id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("cannot save comment reply without identity"))?;
        let parent = reply
            .review_reply_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("cannot save comment reply without a parent"))?;
        let conn = self
            .conn
            .lock()
            .expect("CommentReplyRepository: failed to acquire database lock");
        conn.execute(
            r#"
            INSERT OR REPLACE INTO comment_replies (
                id, kind, review_reply_id, reply_to_id, text, rich_text,
                force_text_type, include_text_types, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            rusqlite::params![
                id,
                reply.kind.to_string(),
                parent,
                reply.reply_to_id,
                reply.text,
                reply.rich_text,
                reply.force_text_type.map(|t| t.to_string()),
                reply.include_text_types.map(|t| t.to_string()),
                reply.created_at,
                reply.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<CommentReply>> {
        let conn = self
            .conn
            .lock()
            .expect("CommentReplyRepository: failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, kind, review_reply_id, reply_to_id, text, rich_text,
                   force_text_type, include_text_types, created_at, updated_at
            FROM comment_replies
            WHERE id = ?1
            "#,
        )?;

        let mut rows = stmt.query_map([id], Self::row_to_reply)?;
        rows.next().transpose().map_err(Into::into)
    }

    pub fn list_for_review_reply(&self, review_reply_id: &str) -> Result<Vec<CommentReply>> {
        let conn = self
            .conn
            .lock()
            .expect("CommentReplyRepository: failed to acquire database lock");
        let mut stmt = conn.prepare(
            r#"
            SELECT id, kind, review_reply_id, reply_to_id, text, rich_text,
                   force_text_type, include_text_types, created_at, updated_at
            FROM comment_replies
            WHERE review_reply_id = ?1
            ORDER BY created_at
            "#,
        )?;

        let rows = stmt.query_map([review_reply_id], Self::row_to_reply)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn delete(&self, id: &str) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .expect("CommentReplyRepository: failed to acquire database lock");
        let affected = conn.execute("DELETE FROM comment_replies WHERE id = ?1", [id])?;
        Ok(affected)
    }

    fn row_to_reply(row: &Row) -> rusqlite::Result<CommentReply> {
        let kind: String = row.get(1)?;
        let force: Option<String> = row.get(6)?;
        let include: Option<String> = row.get(7)?;
        Ok(CommentReply {
            id: Some(row.get(0)?),
            kind: CommentReplyKind::from_str(&kind).unwrap_or(CommentReplyKind::General),
            review_reply_id: Some(row.get(2)?),
            reply_to_id: row.get(3)?,
            text: row.get(4)?,
            rich_text: row.get(5)?,
            force_text_type: force.and_then(|t| TextType::from_str(&t).ok()),
            include_text_types: include.and_then(|t| TextType::from_str(&t).ok()),
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}
