//! Authenticated principal
//!
//! `require_auth` inserts an `AuthContext` into the request extensions once
//! the session has been validated and the user resolved.

/// Identity of the user making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
