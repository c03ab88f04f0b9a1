//! replydraft CLI entry point.
//!
//! Inspects and grooms reply drafts kept in the local SQLite store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use replydraft::domain::ReviewReplyHandle;
use replydraft::infra::db::Database;
use replydraft::infra::store::{self, RemoteStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "replydraft")]
#[command(about = "Inspect and groom locally persisted reply drafts", long_about = None)]
struct Args {
    /// Path to the drafts database (defaults to REPLYDRAFT_DB_PATH, then
    /// the platform data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List reply drafts and the comment replies parented to them
    Drafts {
        /// Emit machine-readable JSON instead of the plain listing
        #[arg(long)]
        json: bool,
    },
    /// Discard review reply drafts that ended up with no content
    DiscardEmpty,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let db = match args.db {
        Some(path) => Database::open_at(path),
        None => Database::open(),
    }
    .context("open drafts database")?;
    let store = SqliteStore::new(db);

    match args.command {
        Commands::Drafts { json } => list_drafts(&store, json).await,
        Commands::DiscardEmpty => discard_empty(&store).await,
    }
}

#[derive(serde::Serialize)]
struct DraftListing {
    #[serde(flatten)]
    draft: replydraft::domain::ReviewReply,
    comment_replies: Vec<replydraft::domain::CommentReply>,
}

async fn list_drafts(store: &SqliteStore, json: bool) -> Result<()> {
    let drafts = store.database().review_reply_repo().list_drafts()?;

    if json {
        let mut listings = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let comment_replies = store.list_replies(&draft).await?;
            listings.push(DraftListing {
                draft,
                comment_replies,
            });
        }
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if drafts.is_empty() {
        println!("No reply drafts.");
        return Ok(());
    }

    for draft in drafts {
        println!(
            "review {} (draft {})",
            draft.review_id,
            draft.id.as_deref().unwrap_or("-")
        );
        if !draft.body_top.trim().is_empty() {
            println!("  body-top: {}", draft.body_top);
        }
        if !draft.body_bottom.trim().is_empty() {
            println!("  body-bottom: {}", draft.body_bottom);
        }
        for reply in store.list_replies(&draft).await? {
            println!(
                "  [{}] reply to {}: {}",
                reply.kind, reply.reply_to_id, reply.text
            );
        }
    }
    Ok(())
}

async fn discard_empty(store: &SqliteStore) -> Result<()> {
    let drafts = store.database().review_reply_repo().list_drafts()?;
    let mut discarded = 0usize;
    for draft in drafts {
        let review_id = draft.review_id.clone();
        let handle = ReviewReplyHandle::new(draft);
        if store::discard_if_empty(&handle, store).await? {
            log::info!("discarded empty draft for review {review_id}");
            discarded += 1;
        }
    }
    println!("Discarded {discarded} empty draft(s).");
    Ok(())
}
