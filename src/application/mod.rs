//! Application layer (use-cases, policies).
//!
//! This module orchestrates domain logic without depending on UI
//! frameworks or a concrete storage backend.

pub mod editor;
