//! SQLite database setup and connection management for replydraft.
//! Handles database initialization, schema creation, and connection management.

use anyhow::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Database wrapper that manages SQLite connections
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Create or open the database at the default location
    pub fn open() -> Result<Self> {
        let path = Self::default_path();
        Self::open_at(path)
    }

    /// Create an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create or open the database at a specific path
    pub fn open_at(path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Get the default database path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("REPLYDRAFT_DB_PATH") {
            return PathBuf::from(path);
        }

        #[cfg(target_os = "macos")]
        {
            if let Some(home) = home::home_dir() {
                return home
                    .join("Library")
                    .join("Application Support")
                    .join("replydraft")
                    .join("db.sqlite");
            }
        }

        #[cfg(target_os = "linux")]
        {
            if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
                return PathBuf::from(xdg).join("replydraft").join("db.sqlite");
            }
            if let Some(home) = home::home_dir() {
                return home
                    .join(".local")
                    .join("share")
                    .join("replydraft")
                    .join("db.sqlite");
            }
        }

        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".replydraft")
            .join("db.sqlite")
    }

    /// Initialize database schema
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        const SCHEMA_VERSION: i32 = 1;

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let existing_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if existing_version < SCHEMA_VERSION {
            Self::create_schema(&conn)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }

        Ok(())
    }

    /// Get a reference to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn review_reply_repo(&self) -> crate::infra::db::repository::ReviewReplyRepository {
        crate::infra::db::repository::ReviewReplyRepository::new(self.connection())
    }

    pub fn comment_reply_repo(&self) -> crate::infra::db::repository::CommentReplyRepository {
        crate::infra::db::repository::CommentReplyRepository::new(self.connection())
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS review_replies (
                id TEXT PRIMARY KEY,
                review_id TEXT NOT NULL,
                body_top TEXT NOT NULL DEFAULT '',
                body_top_rich_text INTEGER NOT NULL DEFAULT 0,
                body_bottom TEXT NOT NULL DEFAULT '',
                body_bottom_rich_text INTEGER NOT NULL DEFAULT 0,
                public INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comment_replies (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                review_reply_id TEXT NOT NULL,
                reply_to_id TEXT NOT NULL,
                text TEXT NOT NULL DEFAULT '',
                rich_text INTEGER NOT NULL DEFAULT 0,
                force_text_type TEXT,
                include_text_types TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(review_reply_id) REFERENCES review_replies(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_comment_replies_parent
                ON comment_replies(review_reply_id);
            "#,
        )?;
        Ok(())
    }
}
