//! Authentication API endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::{
    AuthContext, AuthManager, AuthState, hash_password, require_auth, verify_password,
};
use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, normalize_email, validate_not_blank};
use crate::core::constants::MIN_PASSWORD_LEN;
use crate::data::SharedRepository;
use crate::data::cache::CacheService;
use crate::data::types::{NewUser, UserRow};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "First name must be at most 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Last name must be at most 100 characters")
    )]
    pub last_name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(
        min = MIN_PASSWORD_LEN,
        max = 256,
        message = "Password must be at least 6 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, max = 256, message = "Password is required"))]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserDto,
}

/// Auth state with database access
#[derive(Clone)]
pub struct AuthRoutesState {
    pub auth_manager: Arc<AuthManager>,
    pub repository: SharedRepository,
    pub cache: Arc<CacheService>,
}

/// Create auth routes
///
/// `/me` is guarded by `require_auth`; the other routes are public.
pub fn routes(
    auth_manager: Arc<AuthManager>,
    repository: SharedRepository,
    cache: Arc<CacheService>,
) -> Router {
    let auth_state = AuthState {
        auth_manager: auth_manager.clone(),
        repository: repository.clone(),
        cache: cache.clone(),
    };
    let state = AuthRoutesState {
        auth_manager,
        repository,
        cache,
    };

    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            require_auth,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
        .with_state(state)
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("INVALID_CREDENTIALS", "Invalid credentials")
}

fn start_session(
    manager: &AuthManager,
    jar: CookieJar,
    user_id: &str,
) -> Result<CookieJar, ApiError> {
    let jwt = manager.issue_session(user_id).map_err(|e| {
        tracing::error!(error = %e, "Failed to issue session token");
        ApiError::internal("Failed to create session")
    })?;
    Ok(jar.add(manager.session_cookie(jwt)))
}

/// Register a new user and start a session
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = SessionResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), ApiError> {
    let email = normalize_email(&body.email);
    let password_hash = hash_password(body.password).await.map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        ApiError::internal("Failed to register user")
    })?;

    let user = state
        .repository
        .create_user(
            Some(&state.cache),
            &NewUser {
                email: &email,
                first_name: body.first_name.trim(),
                last_name: body.last_name.trim(),
                password_hash: &password_hash,
            },
        )
        .await
        .map_err(|e| ApiError::from_write(e, "USER_EXISTS"))?;

    tracing::info!(user_id = %user.id, "User registered");

    let jar = start_session(&state.auth_manager, jar, &user.id)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            message: "User registered successfully",
            user: user.into(),
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), ApiError> {
    let email = normalize_email(&body.email);
    let user = state
        .repository
        .get_user_by_email(&email)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(invalid_credentials)?;

    let valid = verify_password(body.password, user.password_hash.clone())
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Password verification failed");
            ApiError::internal("Failed to verify credentials")
        })?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    let jar = start_session(&state.auth_manager, jar, &user.id)?;
    Ok((
        jar,
        Json(SessionResponse {
            message: "Login successful",
            user: user.into(),
        }),
    ))
}

/// Logout - clear session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out successfully")
    )
)]
pub async fn logout(
    State(state): State<AuthRoutesState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    (
        jar.add(state.auth_manager.cleared_cookie()),
        Json(serde_json::json!({
            "message": "Logged out successfully"
        })),
    )
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AuthRoutesState>,
    auth: AuthContext,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state
        .repository
        .get_user(Some(&state.cache), auth.user_id())
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_body(password: &str) -> RegisterRequest {
        serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": password
        }))
        .unwrap()
    }

    #[test]
    fn test_register_password_minimum_length() {
        let too_short = "x".repeat(MIN_PASSWORD_LEN as usize - 1);
        let errors = register_body(&too_short).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let just_enough = "x".repeat(MIN_PASSWORD_LEN as usize);
        assert!(register_body(&just_enough).validate().is_ok());
    }
}
