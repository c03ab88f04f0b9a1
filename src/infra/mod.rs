//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations: the remote store contract
//! and its in-memory and SQLite-backed implementations.

pub mod db;
pub mod store;
