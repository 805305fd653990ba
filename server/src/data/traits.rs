//! Repository traits for database backends
//!
//! Route handlers talk to storage through [`TransactionalRepository`], which
//! keeps them independent of the SQLite adapter and lets tests substitute
//! their own implementation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::cache::CacheService;
use crate::data::error::DataError;
use crate::data::types::{LeadChanges, LeadRow, ListLeadsParams, NewLead, NewUser, UserRow};

/// Repository trait for users and leads
///
/// Lead operations are always scoped to an owner. Uniqueness violations are
/// reported as `DataError::Conflict`.
#[async_trait]
pub trait TransactionalRepository: Send + Sync {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        cache: Option<&CacheService>,
        new_user: &NewUser<'_>,
    ) -> Result<UserRow, DataError>;

    async fn get_user(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError>;

    // ==================== Lead Operations ====================

    async fn create_lead(&self, owner_id: &str, lead: &NewLead) -> Result<LeadRow, DataError>;

    async fn get_lead(&self, owner_id: &str, id: &str) -> Result<Option<LeadRow>, DataError>;

    /// One page of leads plus the total number of matches
    async fn list_leads(&self, params: &ListLeadsParams)
    -> Result<(Vec<LeadRow>, u64), DataError>;

    async fn update_lead(
        &self,
        owner_id: &str,
        id: &str,
        changes: &LeadChanges,
    ) -> Result<Option<LeadRow>, DataError>;

    /// Returns `false` when nothing was deleted
    async fn delete_lead(&self, owner_id: &str, id: &str) -> Result<bool, DataError>;
}

/// Shared handle to the repository used by route handlers
pub type SharedRepository = Arc<dyn TransactionalRepository>;
