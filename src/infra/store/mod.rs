//! Remote store contract for reply persistence.
//!
//! The editor only ever talks to [`RemoteStore`]; transport, payload shape
//! and authentication live behind it. Failures surface as [`StoreError`]
//! with an opaque reason and are never retried here.

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryStore, StoreOp};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::domain::{
    CommentReply, ReplyField, ReviewReply, ReviewReplyField, ReviewReplyHandle, StoreError,
};

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Resolve once `parent` has a durable identity, creating the draft
    /// lazily when it has none. Returns the persisted state.
    async fn await_ready(&self, parent: &ReviewReply) -> Result<ReviewReply, StoreError>;

    /// Persist a new comment reply. Returns the stored record with its
    /// assigned identity.
    async fn create_reply(&self, record: &CommentReply) -> Result<CommentReply, StoreError>;

    /// Persist only the given fields of an existing comment reply.
    async fn update_reply(
        &self,
        record: &CommentReply,
        fields: &[ReplyField],
    ) -> Result<CommentReply, StoreError>;

    /// Remove a persisted comment reply.
    async fn destroy_reply(&self, record: &CommentReply) -> Result<(), StoreError>;

    /// Persist only the given body fields of the review reply itself.
    async fn update_review_body(
        &self,
        parent: &ReviewReply,
        fields: &[ReviewReplyField],
    ) -> Result<ReviewReply, StoreError>;

    /// Remove a persisted review reply draft and its comment replies.
    async fn destroy_review_reply(&self, parent: &ReviewReply) -> Result<(), StoreError>;

    /// Open comment replies parented to `parent`.
    async fn list_replies(&self, parent: &ReviewReply) -> Result<Vec<CommentReply>, StoreError>;
}

/// Discard a review reply draft that ended up with no content.
///
/// Destroys the draft remotely when it has a durable identity, both body
/// fields are blank, and no comment replies remain; subscribers observe
/// the destruction through the handle. Resolves `true` iff a discard
/// actually happened. The editor never calls this on its own; it is the
/// draft owner's decision.
pub async fn discard_if_empty(
    handle: &ReviewReplyHandle,
    store: &dyn RemoteStore,
) -> Result<bool, StoreError> {
    let snapshot = handle.snapshot();
    if snapshot.is_new() || !snapshot.is_body_empty() {
        return Ok(false);
    }
    if !store.list_replies(&snapshot).await?.is_empty() {
        return Ok(false);
    }

    store.destroy_review_reply(&snapshot).await?;
    log::debug!(
        "discarded empty review reply {:?} for review {}",
        snapshot.id,
        snapshot.review_id
    );
    handle.mark_destroyed();
    Ok(true)
}
