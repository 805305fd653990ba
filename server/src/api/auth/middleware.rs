//! Authentication middleware

use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde_json::json;

use super::context::AuthContext;
use super::jwt::JwtError;
use super::manager::AuthManager;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::data::SharedRepository;
use crate::data::cache::CacheService;

/// Authentication error response
#[derive(Debug)]
pub struct AuthError {
    pub status: StatusCode,
    pub error: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl AuthError {
    pub fn required() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "AUTH_REQUIRED",
            message: "Authentication required".to_string(),
        }
    }

    pub fn expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_EXPIRED",
            message: "Session has expired".to_string(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: "unauthorized",
            code: "TOKEN_INVALID",
            message: "Invalid session token".to_string(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: "service_unavailable",
            code: "SERVICE_UNAVAILABLE",
            message: "Unable to verify session".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.error,
            "code": self.code,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Shared auth state for middleware
#[derive(Clone)]
pub struct AuthState {
    pub auth_manager: Arc<AuthManager>,
    pub repository: SharedRepository,
    /// Cache for user lookups
    pub cache: Arc<CacheService>,
}

/// Session token from the `token` cookie, else an `Authorization: Bearer` header
fn session_token(jar: &CookieJar, request: &Request) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Authentication middleware
///
/// Validates the session JWT and checks that its user still exists.
/// Injects `AuthContext` into request extensions.
pub async fn require_auth(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let jwt = session_token(&jar, &request).ok_or_else(AuthError::required)?;

    let claims = state
        .auth_manager
        .validate_session(&jwt)
        .map_err(|e| match e {
            JwtError::Expired => AuthError::expired(),
            _ => AuthError::invalid(),
        })?;

    let user = state
        .repository
        .get_user(Some(&state.cache), claims.user_id())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to resolve session user");
            AuthError::unavailable()
        })?;

    let Some(user) = user else {
        tracing::debug!(user_id = %claims.user_id(), "Session user no longer exists");
        return Err(AuthError::invalid());
    };

    request.extensions_mut().insert(AuthContext::new(user.id));

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_prefers_cookie() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer from-header")
            .body(axum::body::Body::empty())
            .unwrap();
        let jar = CookieJar::new().add((SESSION_COOKIE_NAME, "from-cookie"));
        assert_eq!(
            session_token(&jar, &request).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_token_falls_back_to_bearer() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(
            session_token(&CookieJar::new(), &request).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_token_absent() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Basic dXNlcg==")
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(session_token(&CookieJar::new(), &request).is_none());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::required().code, "AUTH_REQUIRED");
        assert_eq!(AuthError::expired().code, "TOKEN_EXPIRED");
        assert_eq!(AuthError::invalid().status, StatusCode::UNAUTHORIZED);
    }
}
