//! Data storage layer
//!
//! - `sqlite` - Record store for users and leads
//! - `filters` - Lead filter compiler and SQL rendering
//! - `cache` - In-memory caching with rate limiting
//! - `types` - Row types shared by the store and the API
//! - `traits` - Repository trait the API depends on
//! - `error` - Unified error type for the data layer

pub mod cache;
pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::{SharedRepository, TransactionalRepository};
