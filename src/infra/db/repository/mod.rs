//! Repository implementations for data access in replydraft.
//!
//! Provides database operations for review reply drafts and the comment
//! replies parented to them.

mod comment_reply;
mod review_reply;

pub use comment_reply::CommentReplyRepository;
pub use review_reply::ReviewReplyRepository;

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub(super) type DbConn = Arc<Mutex<Connection>>;
