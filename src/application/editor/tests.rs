use super::*;
use crate::domain::{CommentReplyKind, ReviewReply, ReviewReplyHandle, StoreError};
use crate::infra::store::{MemoryStore, StoreOp};
use tokio::sync::mpsc::UnboundedReceiver;

fn drain(rx: &mut UnboundedReceiver<EditorEvent>) -> Vec<EditorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn new_editor(
    context_kind: ReplyContextKind,
    context_id: Option<&str>,
    handle: &ReviewReplyHandle,
) -> (ReplyEditor, UnboundedReceiver<EditorEvent>) {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let editor = ReplyEditor::new(ReplyEditorOptions {
        anchor_prefix: Some("reply".into()),
        context_kind,
        context_id: context_id.map(Into::into),
        comment_id: None,
        review_reply: handle.clone(),
        events: tx,
    });
    (editor, rx)
}

async fn ready_handle(store: &MemoryStore) -> ReviewReplyHandle {
    let persisted = store.await_ready(&ReviewReply::new("review-1")).await.unwrap();
    ReviewReplyHandle::new(persisted)
}

#[tokio::test]
async fn test_body_top_save_targets_review_reply() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::BodyTop, None, &handle);

    editor.set_text("Thanks everyone");
    editor.save(&store).await.unwrap();

    // The review reply's field pair was written; no comment reply exists.
    assert_eq!(handle.snapshot().body_top, "Thanks everyone");
    assert!(editor.reply_object().is_none());
    assert_eq!(store.reply_count(), 0);
    assert!(store.calls().contains(&StoreOp::UpdateReviewBody));
    assert!(!store.calls().contains(&StoreOp::CreateReply));

    assert!(editor.has_draft());
    assert_eq!(editor.state(), EditorState::Saved);
    assert_eq!(
        drain(&mut rx),
        vec![EditorEvent::Saving, EditorEvent::TextUpdated, EditorEvent::Saved]
    );
}

#[tokio::test]
async fn test_body_bottom_save_targets_bottom_pair() {
    let store = MemoryStore::new();
    let handle = ready_handle(&store).await;
    let (mut editor, _rx) = new_editor(ReplyContextKind::BodyBottom, None, &handle);

    editor.set_rich_text(true);
    editor.set_text("See you in the next revision");
    editor.save(&store).await.unwrap();

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.body_bottom, "See you in the next revision");
    assert!(snapshot.body_bottom_rich_text);
    assert!(snapshot.body_top.is_empty());
}

#[tokio::test]
async fn test_comment_save_constructs_mapped_variant() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, _rx) = new_editor(
        ReplyContextKind::ScreenshotComment,
        Some("comment-7"),
        &handle,
    );

    editor.set_text("nice catch");
    editor.save(&store).await.unwrap();

    let record = editor.reply_object().expect("record constructed");
    assert_eq!(record.kind, CommentReplyKind::Screenshot);
    assert_eq!(record.reply_to_id, "comment-7");
    assert!(!record.is_new());
    assert_eq!(store.reply_count(), 1);
}

#[tokio::test]
async fn test_diff_comment_save_scenario() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("looks good");
    editor.save(&store).await.unwrap();

    let record = editor.reply_object().unwrap();
    assert_eq!(record.kind, CommentReplyKind::Diff);
    assert_eq!(record.reply_to_id, "10");
    assert_eq!(record.force_text_type, Some(TextType::Html));
    assert_eq!(record.include_text_types, Some(TextType::Raw));

    assert!(editor.has_draft());
    assert!(editor.rich_text());
    assert_eq!(editor.comment_id(), record.id.as_deref());
    assert!(drain(&mut rx).contains(&EditorEvent::Saved));
}

#[tokio::test]
async fn test_second_save_updates_existing_record() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, _rx) = new_editor(ReplyContextKind::GeneralComment, Some("c-3"), &handle);

    editor.set_text("first thoughts");
    editor.save(&store).await.unwrap();
    let first_id = editor.comment_id().map(String::from);

    editor.set_text("second thoughts");
    editor.save(&store).await.unwrap();

    // Addressed, not duplicated.
    assert_eq!(editor.comment_id().map(String::from), first_id);
    assert_eq!(store.reply_count(), 1);
    assert_eq!(
        store.reply(first_id.as_deref().unwrap()).unwrap().text,
        "second thoughts"
    );
    assert!(store.calls().contains(&StoreOp::UpdateReply));
}

#[tokio::test]
async fn test_save_with_empty_text_delegates_to_reset() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::BodyTop, None, &handle);

    editor.save(&store).await.unwrap();

    // No write of any kind was issued, only parent readiness.
    assert_eq!(store.calls(), vec![StoreOp::AwaitReady]);
    assert_eq!(editor.state(), EditorState::Empty);
    assert!(!editor.has_draft());
    assert_eq!(drain(&mut rx), vec![EditorEvent::Saving, EditorEvent::ResetState]);
}

#[tokio::test]
async fn test_reset_with_pending_text_is_noop() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("not done typing  ");
    drain(&mut rx);

    editor.reset_state_if_empty(&store).await.unwrap();

    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(editor.text(), "not done typing  ");
    assert!(store.calls().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_reset_without_persisted_record_clears_locally() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::GeneralComment, Some("c-1"), &handle);

    editor.reset_state_if_empty(&store).await.unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(editor.state(), EditorState::Empty);
    assert_eq!(drain(&mut rx), vec![EditorEvent::ResetState]);
}

#[tokio::test]
async fn test_reset_body_slot_never_discards_parent() {
    let store = MemoryStore::new();
    let handle = ready_handle(&store).await;
    let (mut editor, mut rx) = new_editor(ReplyContextKind::BodyTop, None, &handle);

    editor.set_text("draft header");
    editor.save(&store).await.unwrap();
    drain(&mut rx);

    editor.set_text("");
    editor.reset_state_if_empty(&store).await.unwrap();

    // Local clear only; the parent draft is untouched.
    assert_eq!(drain(&mut rx), vec![EditorEvent::ResetState]);
    assert!(!store.calls().contains(&StoreOp::DestroyReviewReply));
    assert!(store.review_reply(handle.snapshot().id.as_deref().unwrap()).is_some());
}

#[tokio::test]
async fn test_reset_destroys_persisted_comment_reply() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("temporary note");
    editor.save(&store).await.unwrap();
    let id = editor.comment_id().map(String::from).unwrap();
    drain(&mut rx);

    editor.set_text("");
    editor.reset_state_if_empty(&store).await.unwrap();

    assert!(store.reply(&id).is_none());
    assert!(editor.reply_object().is_none());
    assert!(editor.comment_id().is_none());
    assert!(!editor.has_draft());
    assert_eq!(drain(&mut rx), vec![EditorEvent::ResetState]);
}

#[tokio::test]
async fn test_reset_fires_only_after_destroy_succeeds() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("temporary note");
    editor.save(&store).await.unwrap();
    drain(&mut rx);

    editor.set_text("");
    store.fail_next(StoreOp::DestroyReply, "offline");
    let err = editor.reset_state_if_empty(&store).await.unwrap_err();
    assert!(matches!(err, EditorError::Store(StoreError::Unavailable(_))));

    // Nothing cleared, nothing emitted; the record survives for retry.
    assert!(editor.reply_object().is_some());
    assert!(editor.has_draft());
    assert!(drain(&mut rx).is_empty());

    editor.reset_state_if_empty(&store).await.unwrap();
    assert_eq!(drain(&mut rx), vec![EditorEvent::ResetState]);
}

#[tokio::test]
async fn test_save_failure_leaves_state_for_retry() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::UntouchedComment, Some("c-9"), &handle);

    editor.set_text("will fail once");
    store.fail_next(StoreOp::CreateReply, "offline");

    let err = editor.save(&store).await.unwrap_err();
    assert!(matches!(err, EditorError::Store(_)));
    assert_eq!(editor.text(), "will fail once");
    assert!(!editor.has_draft());
    assert_eq!(editor.state(), EditorState::Editing);
    assert_eq!(drain(&mut rx), vec![EditorEvent::Saving]);

    editor.save(&store).await.unwrap();
    assert!(editor.has_draft());
    assert_eq!(
        drain(&mut rx),
        vec![EditorEvent::Saving, EditorEvent::TextUpdated, EditorEvent::Saved]
    );
}

#[tokio::test]
async fn test_failed_empty_save_restores_prior_state() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::BodyTop, None, &handle);

    store.fail_next(StoreOp::AwaitReady, "offline");

    let err = editor.save(&store).await.unwrap_err();
    assert!(matches!(err, EditorError::Store(StoreError::Unavailable(_))));

    // With no text there is nothing being edited; the editor stays empty.
    assert_eq!(editor.state(), EditorState::Empty);
    assert_eq!(drain(&mut rx), vec![EditorEvent::Saving]);
}

#[tokio::test]
async fn test_reassigning_parent_swaps_subscription_once() {
    let first = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let second = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::BodyTop, None, &first);

    assert_eq!(first.subscriber_count(), 1);
    assert_eq!(second.subscriber_count(), 0);

    editor.set_review_reply(second.clone());
    assert_eq!(first.subscriber_count(), 0);
    assert_eq!(second.subscriber_count(), 1);

    // Events on the old parent no longer reach the editor.
    first.mark_published();
    assert_eq!(editor.process_parent_events(), 0);
    assert!(drain(&mut rx).is_empty());

    second.mark_published();
    assert_eq!(editor.process_parent_events(), 1);
    assert_eq!(drain(&mut rx), vec![EditorEvent::Published, EditorEvent::ResetState]);
}

#[tokio::test]
async fn test_parent_destroyed_discards_editor() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("pending");
    editor.save(&store).await.unwrap();
    drain(&mut rx);
    let calls_before = store.calls().len();

    handle.mark_destroyed();
    editor.process_parent_events();

    assert_eq!(drain(&mut rx), vec![EditorEvent::Discarded, EditorEvent::ResetState]);
    assert!(editor.reply_object().is_none());
    assert!(!editor.has_draft());
    // The clear is local; no remote traffic.
    assert_eq!(store.calls().len(), calls_before);
}

#[tokio::test]
async fn test_parent_published_clears_without_discard() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, mut rx) = new_editor(ReplyContextKind::GeneralComment, Some("c-2"), &handle);

    editor.set_text("shipping it");
    editor.save(&store).await.unwrap();
    drain(&mut rx);
    let calls_before = store.calls().len();

    handle.mark_published();
    editor.process_parent_events();

    assert_eq!(drain(&mut rx), vec![EditorEvent::Published, EditorEvent::ResetState]);
    assert!(editor.comment_id().is_none());
    assert!(!editor.has_draft());
    assert!(editor.reply_object().is_none());
    assert_eq!(store.calls().len(), calls_before);
}

#[tokio::test]
async fn test_saved_text_refreshed_from_persisted_value() {
    let store = MemoryStore::new();
    let handle = ReviewReplyHandle::new(ReviewReply::new("review-1"));
    let (mut editor, _rx) = new_editor(ReplyContextKind::DiffComment, Some("10"), &handle);

    editor.set_text("normalize me");
    editor.save(&store).await.unwrap();

    // Server is authoritative for the normalized rich-text form.
    assert_eq!(editor.text(), "normalize me");
    assert!(editor.rich_text());
}
