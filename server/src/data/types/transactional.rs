//! Row types for the transactional store (users and leads)

use serde::{Deserialize, Serialize};

use super::enums::{LeadSource, LeadStatus};
use crate::data::filters::{QueryExpression, SortDirection};

// ============================================================================
// User types
// ============================================================================

/// User row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields required to register a user
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
}

// ============================================================================
// Lead types
// ============================================================================

/// Lead row from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRow {
    pub id: String,
    /// Owning user id
    pub created_by: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i64,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validated input for inserting a lead
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub score: i64,
    pub lead_value: f64,
    pub is_qualified: bool,
    pub last_activity_at: Option<i64>,
}

/// Partial update of a lead
///
/// `None` leaves the column untouched. For nullable columns `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    pub score: Option<i64>,
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<Option<i64>>,
}

impl LeadChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parameters for listing a principal's leads
#[derive(Debug, Clone)]
pub struct ListLeadsParams {
    /// Principal whose leads are listed; always enforced
    pub owner_id: String,
    pub filter: QueryExpression,
    /// Whitelisted column name
    pub sort_column: &'static str,
    pub direction: SortDirection,
    pub page: u32,
    pub limit: u32,
}

impl ListLeadsParams {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}
