//! Lead API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::api::types::{
    default_limit, default_page, normalize_email, validate_limit, validate_not_blank,
    validate_page,
};
use crate::data::filters::SortDirection;
use crate::data::types::{LeadChanges, LeadRow, LeadSource, LeadStatus, NewLead};

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::new("finite")
            .with_message("Lead value must be a finite number".into()));
    }
    Ok(())
}

/// Trimmed optional text; blank becomes `None`
fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_datetime(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

/// Lead DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct LeadDto {
    pub id: String,
    /// Owner user id
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
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LeadRow> for LeadDto {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            created_by: row.created_by,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            city: row.city,
            state: row.state,
            source: row.source,
            status: row.status,
            score: row.score,
            lead_value: row.lead_value,
            is_qualified: row.is_qualified,
            last_activity_at: row.last_activity_at.map(to_datetime),
            created_at: to_datetime(row.created_at),
            updated_at: to_datetime(row.updated_at),
        }
    }
}

/// Request body for creating a lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadRequest {
    #[validate(
        custom(function = "validate_not_blank", message = "First name is required"),
        length(max = 100, message = "First name must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "validate_not_blank", message = "Last name is required"),
        length(max = 100, message = "Last name must be at most 100 characters")
    )]
    pub last_name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(max = 200, message = "Phone must be at most 200 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Company must be at most 200 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 200, message = "City must be at most 200 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 200, message = "State must be at most 200 characters"))]
    pub state: Option<String>,
    pub source: LeadSource,
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i64>,
    #[validate(
        range(min = 0.0, message = "Lead value must be a positive number"),
        custom(function = "validate_finite")
    )]
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl CreateLeadRequest {
    pub fn into_new_lead(self) -> NewLead {
        NewLead {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: normalize_email(&self.email),
            phone: clean_optional(self.phone),
            company: clean_optional(self.company),
            city: clean_optional(self.city),
            state: clean_optional(self.state),
            source: self.source,
            status: self.status.unwrap_or_default(),
            score: self.score.unwrap_or(0),
            lead_value: self.lead_value.unwrap_or(0.0),
            is_qualified: self.is_qualified.unwrap_or(false),
            last_activity_at: self.last_activity_at.map(|dt| dt.timestamp()),
        }
    }
}

/// Request body for updating a lead
///
/// Absent fields are left unchanged. An empty string clears an optional
/// text field.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLeadRequest {
    #[validate(
        custom(function = "validate_not_blank", message = "First name cannot be empty"),
        length(max = 100, message = "First name must be at most 100 characters")
    )]
    pub first_name: Option<String>,
    #[validate(
        custom(function = "validate_not_blank", message = "Last name cannot be empty"),
        length(max = 100, message = "Last name must be at most 100 characters")
    )]
    pub last_name: Option<String>,
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
    #[validate(length(max = 200, message = "Phone must be at most 200 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "Company must be at most 200 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 200, message = "City must be at most 200 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 200, message = "State must be at most 200 characters"))]
    pub state: Option<String>,
    pub source: Option<LeadSource>,
    pub status: Option<LeadStatus>,
    #[validate(range(min = 0, max = 100, message = "Score must be between 0 and 100"))]
    pub score: Option<i64>,
    #[validate(
        range(min = 0.0, message = "Lead value must be a positive number"),
        custom(function = "validate_finite")
    )]
    pub lead_value: Option<f64>,
    pub is_qualified: Option<bool>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl UpdateLeadRequest {
    pub fn into_changes(self) -> LeadChanges {
        let nullable = |v: Option<String>| v.map(|s| clean_optional(Some(s)));
        LeadChanges {
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name.map(|s| s.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            phone: nullable(self.phone),
            company: nullable(self.company),
            city: nullable(self.city),
            state: nullable(self.state),
            source: self.source,
            status: self.status,
            score: self.score,
            lead_value: self.lead_value,
            is_qualified: self.is_qualified,
            last_activity_at: self.last_activity_at.map(|dt| Some(dt.timestamp())),
        }
    }
}

/// Query params for listing leads
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLeadsQuery {
    /// Page number (>= 1)
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,

    /// Items per page (1-100)
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,

    /// Column to sort by; unknown names fall back to `created_at`
    pub sort: Option<String>,

    #[serde(default)]
    pub order: SortDirection,

    /// JSON filter description
    pub filters: Option<String>,
}
