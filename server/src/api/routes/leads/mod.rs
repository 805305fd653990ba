//! Lead API endpoints
//!
//! Every operation is scoped to the authenticated user. A lead owned by
//! someone else is reported exactly like a missing one.

pub mod types;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::auth::AuthContext;
use crate::api::extractors::{LeadPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, PageResult};
use crate::data::SharedRepository;
use crate::data::filters::{QueryExpression, columns, parse_filter_json};
use crate::data::types::ListLeadsParams;

use types::{CreateLeadRequest, LeadDto, ListLeadsQuery, UpdateLeadRequest};

/// Shared state for Leads API endpoints
#[derive(Clone)]
pub struct LeadsApiState {
    pub repository: SharedRepository,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadResponse {
    pub lead: LeadDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadMessageResponse {
    pub message: &'static str,
    pub lead: LeadDto,
}

/// Build Leads API routes
pub fn routes(repository: SharedRepository) -> Router<()> {
    let state = LeadsApiState { repository };

    Router::new()
        .route("/", get(list_leads).post(create_lead))
        .route("/{id}", get(get_lead).put(update_lead).delete(delete_lead))
        .with_state(state)
}

fn lead_not_found() -> ApiError {
    ApiError::not_found("LEAD_NOT_FOUND", "Lead not found")
}

/// List the current user's leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "leads",
    params(ListLeadsQuery),
    responses(
        (status = 200, description = "One page of leads", body = PageResult<LeadDto>),
        (status = 400, description = "Invalid pagination or filter JSON"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_leads(
    State(state): State<LeadsApiState>,
    auth: AuthContext,
    ValidatedQuery(query): ValidatedQuery<ListLeadsQuery>,
) -> Result<Json<PageResult<LeadDto>>, ApiError> {
    let filter = match query.filters.as_deref() {
        Some(raw) => parse_filter_json(raw)?,
        None => QueryExpression::default(),
    };
    let sort_column =
        columns::resolve_lead_sort(query.sort.as_deref().unwrap_or(columns::LEAD_DEFAULT_SORT));

    let params = ListLeadsParams {
        owner_id: auth.user_id,
        filter,
        sort_column,
        direction: query.order,
        page: query.page,
        limit: query.limit,
    };

    let (rows, total) = state
        .repository
        .list_leads(&params)
        .await
        .map_err(ApiError::from_data)?;

    let data = rows.into_iter().map(LeadDto::from).collect();
    Ok(Json(PageResult::new(data, params.page, params.limit, total)))
}

/// Create a lead owned by the current user
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadMessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already used by another lead")
    )
)]
pub async fn create_lead(
    State(state): State<LeadsApiState>,
    auth: AuthContext,
    ValidatedJson(body): ValidatedJson<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadMessageResponse>), ApiError> {
    let lead = state
        .repository
        .create_lead(auth.user_id(), &body.into_new_lead())
        .await
        .map_err(|e| ApiError::from_write(e, "LEAD_EMAIL_EXISTS"))?;

    tracing::debug!(lead_id = %lead.id, owner = %auth.user_id(), "Lead created");

    Ok((
        StatusCode::CREATED,
        Json(LeadMessageResponse {
            message: "Lead created successfully",
            lead: lead.into(),
        }),
    ))
}

/// Get one of the current user's leads
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead", body = LeadResponse),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn get_lead(
    State(state): State<LeadsApiState>,
    auth: AuthContext,
    path: LeadPath,
) -> Result<Json<LeadResponse>, ApiError> {
    let lead = state
        .repository
        .get_lead(auth.user_id(), &path.id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(lead_not_found)?;

    Ok(Json(LeadResponse { lead: lead.into() }))
}

/// Update one of the current user's leads
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    request_body = UpdateLeadRequest,
    responses(
        (status = 200, description = "Lead updated", body = LeadMessageResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Lead not found"),
        (status = 409, description = "Email already used by another lead")
    )
)]
pub async fn update_lead(
    State(state): State<LeadsApiState>,
    auth: AuthContext,
    path: LeadPath,
    ValidatedJson(body): ValidatedJson<UpdateLeadRequest>,
) -> Result<Json<LeadMessageResponse>, ApiError> {
    let lead = state
        .repository
        .update_lead(auth.user_id(), &path.id, &body.into_changes())
        .await
        .map_err(|e| ApiError::from_write(e, "LEAD_EMAIL_EXISTS"))?
        .ok_or_else(lead_not_found)?;

    Ok(Json(LeadMessageResponse {
        message: "Lead updated successfully",
        lead: lead.into(),
    }))
}

/// Delete one of the current user's leads
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "leads",
    params(("id" = String, Path, description = "Lead ID")),
    responses(
        (status = 200, description = "Lead deleted"),
        (status = 404, description = "Lead not found")
    )
)]
pub async fn delete_lead(
    State(state): State<LeadsApiState>,
    auth: AuthContext,
    path: LeadPath,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = state
        .repository
        .delete_lead(auth.user_id(), &path.id)
        .await
        .map_err(ApiError::from_data)?;

    if !deleted {
        return Err(lead_not_found());
    }

    tracing::debug!(lead_id = %path.id, owner = %auth.user_id(), "Lead deleted");
    Ok(Json(serde_json::json!({ "message": "Lead deleted successfully" })))
}
