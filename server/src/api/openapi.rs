//! OpenAPI document

use axum::http::header;
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{auth, health, leads};
use crate::data::filters::SortDirection;
use crate::data::types::{LeadSource, LeadStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadbook API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Lead management backend"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration and sessions"),
        (name = "leads", description = "Lead management")
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        // Leads
        leads::list_leads,
        leads::create_lead,
        leads::get_lead,
        leads::update_lead,
        leads::delete_lead,
    ),
    components(schemas(
        SortDirection,
        LeadSource,
        LeadStatus,
        // Health
        health::HealthResponse,
        // Auth
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::UserDto,
        auth::SessionResponse,
        auth::MeResponse,
        // Leads
        leads::types::LeadDto,
        leads::types::CreateLeadRequest,
        leads::types::UpdateLeadRequest,
        leads::LeadResponse,
        leads::LeadMessageResponse,
    ))
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}
