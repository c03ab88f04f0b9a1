use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use super::context::BodySlot;

/// Unique identifier for a persisted review reply.
pub type ReviewReplyId = String;

/// A draft reply to a whole review: owns the body-top/body-bottom text and
/// parents the individual comment replies.
///
/// `id` is absent until the remote store lazily creates the draft, which
/// happens the first time any child save needs a durable parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReply {
    /// Remote identity, when the draft exists server-side.
    #[serde(default)]
    pub id: Option<ReviewReplyId>,
    /// The review being replied to.
    pub review_id: String,
    /// Header text shown above the comment replies.
    #[serde(default)]
    pub body_top: String,
    #[serde(default)]
    pub body_top_rich_text: bool,
    /// Footer text shown below the comment replies.
    #[serde(default)]
    pub body_bottom: String,
    #[serde(default)]
    pub body_bottom_rich_text: bool,
    /// Whether the reply has been published.
    #[serde(default)]
    pub public: bool,
    /// Creation timestamp in RFC3339 format.
    pub created_at: String,
    /// Update timestamp in RFC3339 format.
    pub updated_at: String,
}

/// Fields of a [`ReviewReply`] that a partial save may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReplyField {
    BodyTop,
    BodyTopRichText,
    BodyBottom,
    BodyBottomRichText,
}

impl ReviewReply {
    pub fn new(review_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: None,
            review_id: review_id.into(),
            body_top: String::new(),
            body_top_rich_text: false,
            body_bottom: String::new(),
            body_bottom_rich_text: false,
            public: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Both body fields blank after trimming.
    pub fn is_body_empty(&self) -> bool {
        self.body_top.trim().is_empty() && self.body_bottom.trim().is_empty()
    }

    pub fn body(&self, slot: BodySlot) -> &str {
        match slot {
            BodySlot::Top => &self.body_top,
            BodySlot::Bottom => &self.body_bottom,
        }
    }

    pub fn set_body(&mut self, slot: BodySlot, text: impl Into<String>, rich_text: bool) {
        match slot {
            BodySlot::Top => {
                self.body_top = text.into();
                self.body_top_rich_text = rich_text;
            }
            BodySlot::Bottom => {
                self.body_bottom = text.into();
                self.body_bottom_rich_text = rich_text;
            }
        }
    }

    /// The field pair a body-slot save persists.
    pub fn slot_fields(slot: BodySlot) -> [ReviewReplyField; 2] {
        match slot {
            BodySlot::Top => [ReviewReplyField::BodyTop, ReviewReplyField::BodyTopRichText],
            BodySlot::Bottom => [
                ReviewReplyField::BodyBottom,
                ReviewReplyField::BodyBottomRichText,
            ],
        }
    }
}

/// Lifecycle signals emitted by a review reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReplyEvent {
    /// The draft was discarded server-side.
    Destroyed,
    /// The draft was published and is no longer editable.
    Published,
}

/// Shared handle to a review reply plus its lifecycle event stream.
///
/// Editors hold one of these as their parent reference. Each handle owns
/// its own broadcast channel, so swapping an editor to a new handle drops
/// the old subscription and cannot double-fire.
#[derive(Clone)]
pub struct ReviewReplyHandle {
    inner: Arc<Mutex<ReviewReply>>,
    events: broadcast::Sender<ReviewReplyEvent>,
}

impl ReviewReplyHandle {
    pub fn new(reply: ReviewReply) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(Mutex::new(reply)),
            events,
        }
    }

    /// Copy of the current record state.
    pub fn snapshot(&self) -> ReviewReply {
        self.inner
            .lock()
            .expect("ReviewReplyHandle: poisoned lock")
            .clone()
    }

    /// Mutate the record in place.
    pub fn update(&self, f: impl FnOnce(&mut ReviewReply)) {
        let mut guard = self
            .inner
            .lock()
            .expect("ReviewReplyHandle: poisoned lock");
        f(&mut guard);
        guard.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Subscribe to lifecycle events. Holding the returned receiver is the
    /// subscription; dropping it detaches.
    pub fn subscribe(&self) -> broadcast::Receiver<ReviewReplyEvent> {
        self.events.subscribe()
    }

    /// Number of live subscriptions, for leak checks.
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Notify subscribers the draft was destroyed server-side.
    pub fn mark_destroyed(&self) {
        let _ = self.events.send(ReviewReplyEvent::Destroyed);
    }

    /// Record the draft as published and notify subscribers.
    pub fn mark_published(&self) {
        self.update(|reply| reply.public = true);
        let _ = self.events.send(ReviewReplyEvent::Published);
    }
}

impl std::fmt::Debug for ReviewReplyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewReplyHandle")
            .field("reply", &self.snapshot())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
