//! API server initialization
//!
//! The middleware pipeline, outermost first: request tracing, security
//! headers, CORS, compression, body size limit, per-IP rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::auth::{AuthManager, AuthState, require_auth};
use super::middleware::{self, AllowedOrigins, SecurityHeaders};
use super::openapi::openapi_json;
use super::rate_limit::{RateLimitState, rate_limit_middleware};
use super::routes::{auth, health, leads};
use crate::core::CoreApp;
use crate::core::config::RateLimitConfig;
use crate::core::constants::MAX_BODY_SIZE;
use crate::data::SharedRepository;
use crate::data::cache::{CacheService, RateLimitBucket, RateLimiter};

/// Everything the router needs to serve requests
#[derive(Clone)]
pub struct ApiState {
    pub repository: SharedRepository,
    pub cache: Arc<CacheService>,
    pub auth_manager: Arc<AuthManager>,
    pub rate_limiter: Arc<RateLimiter>,
    pub rate_limit: RateLimitConfig,
    pub allowed_origins: AllowedOrigins,
}

pub struct ApiServer {
    app: CoreApp,
    state: ApiState,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let state = ApiState {
            repository: Arc::new(app.database.clone()),
            cache: app.cache.clone(),
            auth_manager: app.auth.clone(),
            rate_limiter: app.rate_limiter.clone(),
            rate_limit: app.config.rate_limit.clone(),
            allowed_origins: AllowedOrigins::new(&app.config.server.cors_origins),
        };

        Self { app, state }
    }

    /// Build the full application router
    pub fn router(state: ApiState) -> Router {
        let auth_routes = auth::routes(
            state.auth_manager.clone(),
            state.repository.clone(),
            state.cache.clone(),
        );

        let leads_routes = leads::routes(state.repository.clone()).route_layer(
            axum::middleware::from_fn_with_state(
                AuthState {
                    auth_manager: state.auth_manager.clone(),
                    repository: state.repository.clone(),
                    cache: state.cache.clone(),
                },
                require_auth,
            ),
        );

        let router = Router::new()
            .route("/", get(|| async { "Lead API" }))
            .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
            .route("/api/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .nest("/api/auth", auth_routes)
            .nest("/api/leads", leads_routes)
            .fallback(middleware::handle_404);

        let router = if state.rate_limit.enabled {
            router.layer(axum::middleware::from_fn_with_state(
                RateLimitState {
                    limiter: state.rate_limiter.clone(),
                    bucket: RateLimitBucket::api(
                        state.rate_limit.max_requests,
                        state.rate_limit.window_secs,
                    ),
                    bypass_header: state.rate_limit.bypass_header.clone(),
                },
                rate_limit_middleware,
            ))
        } else {
            tracing::debug!("Rate limiting disabled");
            router
        };

        router
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&state.allowed_origins))
            .layer(axum::middleware::from_fn_with_state(
                SecurityHeaders {
                    hsts: state.auth_manager.secure_cookies(),
                },
                middleware::security_headers,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Serve until shutdown is signalled; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app, state } = self;

        let shutdown = app.shutdown.clone();
        let addr = format!("{}:{}", app.config.server.host, app.config.server.port);

        let router = Self::router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Server listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}
