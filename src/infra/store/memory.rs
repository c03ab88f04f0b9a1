//! In-memory [`RemoteStore`] used by tests and throwaway sessions.
//!
//! Records every operation it performs and supports one-shot failure
//! injection per operation, so editor tests can assert both the calls
//! issued and the behavior under persistence failure.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::RemoteStore;
use crate::domain::{
    CommentReply, ReplyField, ReviewReply, ReviewReplyField, StoreError,
};

/// Operations a [`MemoryStore`] can perform, for call-log assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    AwaitReady,
    CreateReply,
    UpdateReply,
    DestroyReply,
    UpdateReviewBody,
    DestroyReviewReply,
    ListReplies,
}

#[derive(Default)]
struct MemoryState {
    review_replies: HashMap<String, ReviewReply>,
    replies: HashMap<String, CommentReply>,
    calls: Vec<StoreOp>,
    fail_next: HashMap<StoreOp, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next invocation of `op` fail with `reason`.
    pub fn fail_next(&self, op: StoreOp, reason: &str) {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        state.fail_next.insert(op, reason.to_string());
    }

    /// Every operation performed so far, in order.
    pub fn calls(&self) -> Vec<StoreOp> {
        self.state
            .lock()
            .expect("MemoryStore: poisoned lock")
            .calls
            .clone()
    }

    /// Stored comment reply by id, if present.
    pub fn reply(&self, id: &str) -> Option<CommentReply> {
        self.state
            .lock()
            .expect("MemoryStore: poisoned lock")
            .replies
            .get(id)
            .cloned()
    }

    /// Stored review reply by id, if present.
    pub fn review_reply(&self, id: &str) -> Option<ReviewReply> {
        self.state
            .lock()
            .expect("MemoryStore: poisoned lock")
            .review_replies
            .get(id)
            .cloned()
    }

    pub fn reply_count(&self) -> usize {
        self.state
            .lock()
            .expect("MemoryStore: poisoned lock")
            .replies
            .len()
    }

    fn begin(state: &mut MemoryState, op: StoreOp) -> Result<(), StoreError> {
        state.calls.push(op);
        if let Some(reason) = state.fail_next.remove(&op) {
            return Err(StoreError::Unavailable(reason));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn await_ready(&self, parent: &ReviewReply) -> Result<ReviewReply, StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::AwaitReady)?;

        if let Some(id) = &parent.id {
            return match state.review_replies.get(id) {
                Some(stored) => Ok(stored.clone()),
                None => Err(StoreError::NotFound(format!("review reply {id}"))),
            };
        }

        let mut created = parent.clone();
        created.id = Some(Uuid::new_v4().to_string());
        created.updated_at = chrono::Utc::now().to_rfc3339();
        state
            .review_replies
            .insert(created.id.clone().unwrap(), created.clone());
        Ok(created)
    }

    async fn create_reply(&self, record: &CommentReply) -> Result<CommentReply, StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::CreateReply)?;

        let mut created = record.clone();
        if created.id.is_none() {
            created.id = Some(Uuid::new_v4().to_string());
        }
        created.updated_at = chrono::Utc::now().to_rfc3339();
        state
            .replies
            .insert(created.id.clone().unwrap(), created.clone());
        Ok(created)
    }

    async fn update_reply(
        &self,
        record: &CommentReply,
        fields: &[ReplyField],
    ) -> Result<CommentReply, StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::UpdateReply)?;

        let id = record
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("comment reply without identity".into()))?;
        let stored = state
            .replies
            .get_mut(&id)
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
        Ok(stored.clone())
    }

    async fn destroy_reply(&self, record: &CommentReply) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::DestroyReply)?;

        let id = record
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("comment reply without identity".into()))?;
        state
            .replies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("comment reply {id}")))
    }

    async fn update_review_body(
        &self,
        parent: &ReviewReply,
        fields: &[ReviewReplyField],
    ) -> Result<ReviewReply, StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::UpdateReviewBody)?;

        let id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("review reply without identity".into()))?;
        let stored = state
            .review_replies
            .get_mut(&id)
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
        Ok(stored.clone())
    }

    async fn destroy_review_reply(&self, parent: &ReviewReply) -> Result<(), StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::DestroyReviewReply)?;

        let id = parent
            .id
            .clone()
            .ok_or_else(|| StoreError::NotFound("review reply without identity".into()))?;
        state
            .review_replies
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("review reply {id}")))?;
        state
            .replies
            .retain(|_, reply| reply.review_reply_id.as_deref() != Some(id.as_str()));
        Ok(())
    }

    async fn list_replies(&self, parent: &ReviewReply) -> Result<Vec<CommentReply>, StoreError> {
        let mut state = self.state.lock().expect("MemoryStore: poisoned lock");
        Self::begin(&mut state, StoreOp::ListReplies)?;

        let Some(id) = &parent.id else {
            return Ok(Vec::new());
        };
        Ok(state
            .replies
            .values()
            .filter(|reply| reply.review_reply_id.as_deref() == Some(id.as_str()))
            .cloned()
            .collect())
    }
}
