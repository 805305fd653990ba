//! Authentication manager

use anyhow::Result;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::AuthConfig;
use crate::core::constants::SESSION_COOKIE_NAME;
use crate::utils::crypto;

/// Issues and validates session tokens and builds the session cookie
#[derive(Debug)]
pub struct AuthManager {
    signing_key: Vec<u8>,
    session_ttl_days: u32,
    secure_cookies: bool,
}

impl AuthManager {
    /// Initialize the authentication manager
    ///
    /// Without a configured secret a random key is generated, so sessions
    /// are lost on restart.
    pub fn init(config: &AuthConfig) -> Self {
        let signing_key = match config.jwt_secret.as_deref() {
            Some(secret) => {
                tracing::debug!("Using configured JWT signing secret");
                secret.as_bytes().to_vec()
            }
            None => {
                tracing::warn!(
                    "No JWT secret configured, using an ephemeral key; sessions will not survive restarts"
                );
                crypto::generate_signing_key()
            }
        };

        Self::with_key(signing_key, config.session_ttl_days, config.secure_cookies)
    }

    pub fn with_key(signing_key: Vec<u8>, session_ttl_days: u32, secure_cookies: bool) -> Self {
        Self {
            signing_key,
            session_ttl_days,
            secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    /// Create a JWT session token for a user
    pub fn issue_session(&self, user_id: &str) -> Result<String> {
        create_session_token(&self.signing_key, user_id, self.session_ttl_days)
    }

    /// Validate a JWT session token
    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key)
    }

    /// Session cookie carrying `jwt`
    pub fn session_cookie(&self, jwt: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, jwt))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .path("/")
            .max_age(time::Duration::days(i64::from(self.session_ttl_days)))
            .build()
    }

    /// Expired session cookie used on logout
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .path("/")
            .max_age(time::Duration::seconds(0))
            .build()
    }
}
