//! SQLite-backed [`RemoteStore`] built on the repository layer.
//!
//! Stands in for the real review server when drafts are kept locally
//! (CLI workflows, offline sessions). Identity assignment and partial
//! writes follow the same contract as the remote API.

use async_trait::async_trait;
use uuid::Uuid;

use super::RemoteStore;
use crate::domain::{
    CommentReply, ReplyField, ReviewReply, ReviewReplyField, StoreError,
};
use crate::infra::db::Database;

pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn await_ready(&self, parent: &ReviewReply) -> Result<ReviewReply, StoreError> {
        let repo = self.db.review_reply_repo();

        if let Some(id) = &parent.id {
            return repo
                .find_by_id(id)
                .map_err(StoreError::OperationFailed)?
                .ok_or_else(|| StoreError::NotFound(format!("review reply {id}")));
        }

        let mut created = parent.clone();
        created.id = Some(Uuid::new_v4().to_string());
        created.updated_at = chrono::Utc::now().to_rfc3339();
        repo.save(&created).map_err(StoreError::OperationFailed)?;
        log::debug!(
            "created review reply draft {:?} for review {}",
            created.id,
            created.review_id
        );
        Ok(created)
    }

    async fn create_reply(&self, record: &CommentReply) -> Result<CommentReply, StoreError> {
        let repo = self.db.comment_reply_repo();

        let mut created = record.clone();
        if created.id.is_none() {
            created.id = Some(Uuid::new_v4().to_string());
        }
        created.updated_at = chrono::Utc::now().to_rfc3339();
        repo.save(&created).map_err(StoreError::OperationFailed)?;
        Ok(created)
    }

    async fn update_reply(
        &self,
        record: &CommentReply,
        fields: &[ReplyField],
    ) -> Result<CommentReply, StoreError> {
        let repo = self.db.comment_reply_repo();
        let id = record
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("comment reply without identity".into()))?;
        let mut stored = repo
            .find_by_id(&id)
            .map_err(StoreError::OperationFailed)?
            .ok_or_else(|| StoreError::NotFound(format!("comment reply {id}")))?;

        for field in fields {
            match field {
                ReplyField::Text => stored.text = record.text.clone(),
                ReplyField::RichText => stored.rich_text = record.rich_text,
                ReplyField::ForceTextType => stored.force_text_type = record.force_text_type,
                ReplyField::IncludeTextTypes => {
                    stored.include_text_types = record.include_text_types
                }
                ReplyField::ReplyToId => stored.reply_to_id = record.reply_to_id.clone(),
            }
        }
        stored.updated_at = chrono::Utc::now().to_rfc3339();
        repo.save(&stored).map_err(StoreError::OperationFailed)?;
        Ok(stored)
    }

    async fn destroy_reply(&self, record: &CommentReply) -> Result<(), StoreError> {
        let repo = self.db.comment_reply_repo();
        let id = record
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("comment reply without identity".into()))?;
        let affected = repo.delete(&id).map_err(StoreError::OperationFailed)?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("comment reply {id}")));
        }
        Ok(())
    }

    async fn update_review_body(
        &self,
        parent: &ReviewReply,
        fields: &[ReviewReplyField],
    ) -> Result<ReviewReply, StoreError> {
        let repo = self.db.review_reply_repo();
        let id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("review reply without identity".into()))?;
        let mut stored = repo
            .find_by_id(&id)
            .map_err(StoreError::OperationFailed)?
            .ok_or_else(|| StoreError::NotFound(format!("review reply {id}")))?;

        for field in fields {
            match field {
                ReviewReplyField::BodyTop => stored.body_top = parent.body_top.clone(),
                ReviewReplyField::BodyTopRichText => {
                    stored.body_top_rich_text = parent.body_top_rich_text
                }
                ReviewReplyField::BodyBottom => stored.body_bottom = parent.body_bottom.clone(),
                ReviewReplyField::BodyBottomRichText => {
                    stored.body_bottom_rich_text = parent.body_bottom_rich_text
                }
            }
        }
        stored.updated_at = chrono::Utc::now().to_rfc3339();
        repo.save(&stored).map_err(StoreError::OperationFailed)?;
        Ok(stored)
    }

    async fn destroy_review_reply(&self, parent: &ReviewReply) -> Result<(), StoreError> {
        let repo = self.db.review_reply_repo();
        let id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("review reply without identity".into()))?;
        let affected = repo.delete(&id).map_err(StoreError::OperationFailed)?;
        if affected == 0 {
            return Err(StoreError::NotFound(format!("review reply {id}")));
        }
        Ok(())
    }

    async fn list_replies(&self, parent: &ReviewReply) -> Result<Vec<CommentReply>, StoreError> {
        let Some(id) = &parent.id else {
            return Ok(Vec::new());
        };
        self.db
            .comment_reply_repo()
            .list_for_review_reply(id)
            .map_err(StoreError::OperationFailed)
    }
}
