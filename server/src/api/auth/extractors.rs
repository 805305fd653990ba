//! Principal extractor for Axum handlers
//!
//! # Usage
//!
//! ```no_run
//! # use leadbook_server::api::auth::AuthContext;
//! # use leadbook_server::api::types::ApiError;
//! pub async fn list_leads(auth: AuthContext) -> Result<(), ApiError> {
//!     let owner = auth.user_id();
//!     Ok(())
//! }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::context::AuthContext;
use crate::api::types::ApiError;

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only reachable when a route is mounted without `require_auth`
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::internal("Auth context not available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extracts_inserted_context() {
        let mut request = Request::builder().body(()).unwrap();
        request.extensions_mut().insert(AuthContext::new("user_1"));
        let (mut parts, _) = request.into_parts();

        let auth = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(auth.user_id(), "user_1");
    }

    #[tokio::test]
    async fn test_missing_context_is_internal_error() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = AuthContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Internal { .. })));
    }
}
