//! The reply editor state machine.
//!
//! One editor exists per thing being replied to: the review reply's
//! body-top, its body-bottom, or an individual comment thread. The editor
//! decides which record a save targets, sequences the asynchronous
//! save/discard operations against the remote store, and reports its
//! lifecycle over an event channel the owner supplied.
//!
//! Overlapping saves on one editor are impossible by construction: every
//! operation takes `&mut self`, so completions always apply inside the
//! call frame that issued them and a cancelled save applies nothing.

use std::fmt;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;

use crate::domain::{
    BodySlot, CommentReply, EditorError, ReplyContextKind, ReplyField, ReplyId, ReviewReply,
    ReviewReplyEvent, ReviewReplyHandle, TextType,
};
use crate::infra::store::RemoteStore;

#[cfg(test)]
mod tests;

/// Where the editor currently is in its draft cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No draft, no text.
    Empty,
    /// Text present, not yet saved.
    Editing,
    /// Save in flight.
    Saving,
    /// A save produced a persisted draft.
    Saved,
    /// Remote destroy in flight.
    Discarding,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Editing => write!(f, "editing"),
            Self::Saving => write!(f, "saving"),
            Self::Saved => write!(f, "saved"),
            Self::Discarding => write!(f, "discarding"),
        }
    }
}

/// Lifecycle notifications the editor emits to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// Emitted before any I/O of a save; observers disable input here.
    Saving,
    /// The write was acknowledged and local state updated.
    Saved,
    /// Local text was refreshed from the persisted value.
    TextUpdated,
    /// Local state was cleared back to empty.
    ResetState,
    /// The parent draft was destroyed.
    Discarded,
    /// The parent draft was published.
    Published,
}

/// Construction parameters for a [`ReplyEditor`].
pub struct ReplyEditorOptions {
    /// Opaque UI anchor identifier; carried, never interpreted.
    pub anchor_prefix: Option<String>,
    /// What this editor replies to. Immutable after construction.
    pub context_kind: ReplyContextKind,
    /// The comment being replied to; becomes `reply_to_id` on new records.
    pub context_id: Option<String>,
    /// Identity of an existing reply record for this context, if any.
    pub comment_id: Option<ReplyId>,
    /// The parent review reply this editor's replies attach to.
    pub review_reply: ReviewReplyHandle,
    /// Channel the editor's lifecycle events are delivered on.
    pub events: mpsc::UnboundedSender<EditorEvent>,
}

/// Orchestrates drafting and committing a reply to a review or one of its
/// comments.
pub struct ReplyEditor {
    anchor_prefix: Option<String>,
    context_kind: ReplyContextKind,
    context_id: Option<String>,
    comment_id: Option<ReplyId>,
    has_draft: bool,
    reply_object: Option<CommentReply>,
    review_reply: ReviewReplyHandle,
    parent_events: broadcast::Receiver<ReviewReplyEvent>,
    rich_text: bool,
    text: String,
    state: EditorState,
    events: mpsc::UnboundedSender<EditorEvent>,
}

impl ReplyEditor {
    pub fn new(options: ReplyEditorOptions) -> Self {
        let parent_events = options.review_reply.subscribe();
        Self {
            anchor_prefix: options.anchor_prefix,
            context_kind: options.context_kind,
            context_id: options.context_id,
            comment_id: options.comment_id,
            has_draft: false,
            reply_object: None,
            review_reply: options.review_reply,
            parent_events,
            rich_text: false,
            text: String::new(),
            state: EditorState::Empty,
            events: options.events,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rich_text(&self) -> bool {
        self.rich_text
    }

    pub fn has_draft(&self) -> bool {
        self.has_draft
    }

    pub fn comment_id(&self) -> Option<&str> {
        self.comment_id.as_deref()
    }

    pub fn reply_object(&self) -> Option<&CommentReply> {
        self.reply_object.as_ref()
    }

    pub fn context_kind(&self) -> ReplyContextKind {
        self.context_kind
    }

    pub fn anchor_prefix(&self) -> Option<&str> {
        self.anchor_prefix.as_deref()
    }

    pub fn review_reply(&self) -> &ReviewReplyHandle {
        &self.review_reply
    }

    /// Update the in-progress text, moving into `Editing` when content
    /// appears on an empty or already-saved editor.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if matches!(self.state, EditorState::Empty | EditorState::Saved) && !self.text.is_empty() {
            self.transition(EditorState::Editing);
        }
    }

    pub fn set_rich_text(&mut self, rich_text: bool) {
        self.rich_text = rich_text;
    }

    /// Swap the editor onto a new parent review reply.
    ///
    /// The old subscription is detached before the new one is attached;
    /// the editor never has two live subscriptions, so a lifecycle event
    /// can neither leak nor double-fire.
    pub fn set_review_reply(&mut self, handle: ReviewReplyHandle) {
        let old = std::mem::replace(&mut self.parent_events, handle.subscribe());
        drop(old);
        self.review_reply = handle;
    }

    /// Drain pending lifecycle events from the parent review reply.
    ///
    /// `Destroyed` emits `Discarded` and clears local state; `Published`
    /// emits `Published` and clears local state. Neither issues a remote
    /// call. Returns how many parent events were handled.
    pub fn process_parent_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.parent_events.try_recv() {
                Ok(ReviewReplyEvent::Destroyed) => {
                    self.emit(EditorEvent::Discarded);
                    self.clear_local_state();
                    handled += 1;
                }
                Ok(ReviewReplyEvent::Published) => {
                    self.emit(EditorEvent::Published);
                    self.clear_local_state();
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    log::warn!("reply editor lagged {skipped} parent events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    /// Save the current reply.
    ///
    /// Emits `Saving` before any I/O and `TextUpdated` then `Saved` once
    /// the write is acknowledged. An empty editor is never saved: empty
    /// text delegates to [`Self::reset_state_if_empty`]. On persistence
    /// failure the error propagates and `reply_object`/`text` are left
    /// untouched so the caller can retry.
    pub async fn save(&mut self, store: &dyn RemoteStore) -> Result<(), EditorError> {
        let slot = self.context_kind.body_slot();

        if slot.is_none() && self.reply_object.is_none() {
            let kind = self
                .context_kind
                .comment_kind()
                .expect("non-body context kind maps to a reply variant");
            let parent_id = self.review_reply.snapshot().id;
            let reply_to = self.context_id.clone().unwrap_or_default();
            self.reply_object = Some(CommentReply::new(
                kind,
                parent_id,
                reply_to,
                self.comment_id.clone(),
            ));
        }

        let previous = self.state;
        self.transition(EditorState::Saving);
        self.emit(EditorEvent::Saving);

        let result = self.save_inner(store, slot).await;
        match result {
            Ok(saved) => {
                if saved {
                    self.has_draft = true;
                    self.rich_text = true;
                    self.transition(EditorState::Saved);
                    self.emit(EditorEvent::TextUpdated);
                    self.emit(EditorEvent::Saved);
                }
                Ok(())
            }
            Err(err) => {
                // Local state stays intact for retry. An editor with no
                // text has nothing to edit, so it returns to where it was.
                if self.text.is_empty() {
                    self.transition(previous);
                } else {
                    self.transition(EditorState::Editing);
                }
                Err(err)
            }
        }
    }

    /// Performs the remote part of a save. Returns `false` when the save
    /// turned into an empty-state reset instead of a write.
    async fn save_inner(
        &mut self,
        store: &dyn RemoteStore,
        slot: Option<BodySlot>,
    ) -> Result<bool, EditorError> {
        // Suspension point: a lazily created parent is first persisted.
        let parent = store.await_ready(&self.review_reply.snapshot()).await?;
        let parent_id = parent.id.clone().ok_or(EditorError::MissingParentIdentity)?;
        // Keep the durable identity on the shared handle so later saves
        // address the same draft.
        self.review_reply.update(|reply| reply.id = Some(parent_id.clone()));

        if self.text.is_empty() {
            self.reset_state_if_empty(store).await?;
            return Ok(false);
        }

        match slot {
            Some(slot) => {
                let mut target = parent;
                target.set_body(slot, self.text.clone(), self.rich_text);
                let stored = store
                    .update_review_body(&target, &ReviewReply::slot_fields(slot))
                    .await?;
                self.text = stored.body(slot).to_string();
                self.review_reply.update(|reply| *reply = stored);
            }
            None => {
                let mut record = self
                    .reply_object
                    .clone()
                    .expect("reply_object resolved before saving");
                record.review_reply_id = Some(parent_id);
                record.text = self.text.clone();
                record.rich_text = self.rich_text;
                // Force rich text on the outgoing write, request raw back.
                record.force_text_type = Some(TextType::Html);
                record.include_text_types = Some(TextType::Raw);

                let stored = if record.is_new() {
                    store.create_reply(&record).await?
                } else {
                    store
                        .update_reply(
                            &record,
                            &[
                                ReplyField::Text,
                                ReplyField::RichText,
                                ReplyField::ForceTextType,
                                ReplyField::IncludeTextTypes,
                                ReplyField::ReplyToId,
                            ],
                        )
                        .await?
                };

                self.comment_id = stored.id.clone();
                self.text = stored.text.clone();
                self.reply_object = Some(stored);
            }
        }

        Ok(true)
    }

    /// Reset the editor state, if the text isn't set.
    ///
    /// Does nothing while trimmed text remains. An unsaved or absent
    /// record clears locally with no remote call, as do the body-top and
    /// body-bottom contexts (the parent draft itself stays; discarding it
    /// is the owner's decision). A persisted per-comment reply is
    /// destroyed remotely first, and `ResetState` fires only after the
    /// destroy completes.
    pub async fn reset_state_if_empty(
        &mut self,
        store: &dyn RemoteStore,
    ) -> Result<(), EditorError> {
        if !self.text.trim().is_empty() {
            return Ok(());
        }

        let destroy_target = match &self.reply_object {
            Some(record) if !record.is_new() && self.context_kind.body_slot().is_none() => {
                Some(record.clone())
            }
            _ => None,
        };

        if let Some(record) = destroy_target {
            let previous = self.state;
            self.transition(EditorState::Discarding);
            if let Err(err) = store.destroy_reply(&record).await {
                self.transition(previous);
                return Err(err.into());
            }
            log::debug!(
                "destroyed {} reply {:?} to comment {}",
                record.kind,
                record.id,
                record.reply_to_id
            );
        }

        self.clear_local_state();
        Ok(())
    }

    /// Forget the current draft: no comment id, no draft flag, no reply
    /// record, then `ResetState`.
    fn clear_local_state(&mut self) {
        self.comment_id = None;
        self.has_draft = false;
        self.reply_object = None;
        self.transition(EditorState::Empty);
        self.emit(EditorEvent::ResetState);
    }

    fn transition(&mut self, next: EditorState) {
        if self.state != next {
            log::debug!(
                "reply editor [{}] {} -> {}",
                self.context_kind,
                self.state,
                next
            );
            self.state = next;
        }
    }

    fn emit(&self, event: EditorEvent) {
        // The owner may drop the receiver during teardown.
        let _ = self.events.send(event);
    }
}
