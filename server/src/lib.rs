//! Leadbook server library
//!
//! - `api` - HTTP routes, middleware and auth
//! - `core` - Configuration, CLI, storage and shutdown
//! - `data` - SQLite store, filter compiler and cache
//! - `utils` - Small helpers for hashing, SQL and paths

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod utils;
