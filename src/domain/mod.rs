//! Domain types for replydraft.
//! Defines the records and context taxonomy the reply editor operates on.

pub mod context;
pub mod error;
pub mod reply;
pub mod review_reply;

pub use context::*;
pub use error::*;
pub use reply::*;
pub use review_reply::*;
