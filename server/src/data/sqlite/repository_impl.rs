//! TransactionalRepository trait implementation for SQLite

use std::sync::Arc;

use async_trait::async_trait;

use crate::data::cache::CacheService;
use crate::data::error::DataError;
use crate::data::traits::TransactionalRepository;
use crate::data::types::{LeadChanges, LeadRow, ListLeadsParams, NewLead, NewUser, UserRow};

use super::SqliteService;
use super::repositories::{lead, user};

#[async_trait]
impl TransactionalRepository for Arc<SqliteService> {
    // ==================== User Operations ====================

    async fn create_user(
        &self,
        cache: Option<&CacheService>,
        new_user: &NewUser<'_>,
    ) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), cache, new_user)
            .await
            .map_err(Into::into)
    }

    async fn get_user(
        &self,
        cache: Option<&CacheService>,
        id: &str,
    ) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), cache, id)
            .await
            .map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_email(self.pool(), email)
            .await
            .map_err(Into::into)
    }

    // ==================== Lead Operations ====================

    async fn create_lead(&self, owner_id: &str, new_lead: &NewLead) -> Result<LeadRow, DataError> {
        lead::create_lead(self.pool(), owner_id, new_lead)
            .await
            .map_err(Into::into)
    }

    async fn get_lead(&self, owner_id: &str, id: &str) -> Result<Option<LeadRow>, DataError> {
        lead::get_lead(self.pool(), owner_id, id)
            .await
            .map_err(Into::into)
    }

    async fn list_leads(
        &self,
        params: &ListLeadsParams,
    ) -> Result<(Vec<LeadRow>, u64), DataError> {
        lead::list_leads(self.pool(), params)
            .await
            .map_err(Into::into)
    }

    async fn update_lead(
        &self,
        owner_id: &str,
        id: &str,
        changes: &LeadChanges,
    ) -> Result<Option<LeadRow>, DataError> {
        lead::update_lead(self.pool(), owner_id, id, changes)
            .await
            .map_err(Into::into)
    }

    async fn delete_lead(&self, owner_id: &str, id: &str) -> Result<bool, DataError> {
        lead::delete_lead(self.pool(), owner_id, id)
            .await
            .map_err(Into::into)
    }
}
