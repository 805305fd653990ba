use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CORS_ORIGIN, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_SESSION_TTL_DAYS,
    MIN_JWT_SECRET_LEN,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Allowed CORS origins (replaces the default dashboard origin)
    pub cors_origins: Option<Vec<String>>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub jwt_secret: Option<String>,
    pub session_ttl_days: Option<u32>,
    pub secure_cookies: Option<bool>,
}

/// Rate limit configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RateLimitFileConfig {
    pub enabled: Option<bool>,
    pub max_requests: Option<u32>,
    pub window_secs: Option<u64>,
    pub bypass_header: Option<String>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Data directory holding the SQLite database
    pub data_dir: Option<String>,
    /// Maximum number of in-memory cache entries
    pub cache_max_entries: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub rate_limit: Option<RateLimitFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
            if server.cors_origins.is_some() {
                tracing::trace!(cors_origins = ?server.cors_origins, "Merging server.cors_origins");
                current.cors_origins = server.cors_origins;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.jwt_secret.is_some() {
                tracing::trace!("Merging auth.jwt_secret");
                current.jwt_secret = auth.jwt_secret;
            }
            if auth.session_ttl_days.is_some() {
                tracing::trace!(session_ttl_days = ?auth.session_ttl_days, "Merging auth.session_ttl_days");
                current.session_ttl_days = auth.session_ttl_days;
            }
            if auth.secure_cookies.is_some() {
                tracing::trace!(secure_cookies = ?auth.secure_cookies, "Merging auth.secure_cookies");
                current.secure_cookies = auth.secure_cookies;
            }
        }

        if let Some(rate_limit) = other.rate_limit {
            let current = self
                .rate_limit
                .get_or_insert_with(RateLimitFileConfig::default);
            if rate_limit.enabled.is_some() {
                tracing::trace!(enabled = ?rate_limit.enabled, "Merging rate_limit.enabled");
                current.enabled = rate_limit.enabled;
            }
            if rate_limit.max_requests.is_some() {
                tracing::trace!(max_requests = ?rate_limit.max_requests, "Merging rate_limit.max_requests");
                current.max_requests = rate_limit.max_requests;
            }
            if rate_limit.window_secs.is_some() {
                tracing::trace!(window_secs = ?rate_limit.window_secs, "Merging rate_limit.window_secs");
                current.window_secs = rate_limit.window_secs;
            }
            if rate_limit.bypass_header.is_some() {
                tracing::trace!("Merging rate_limit.bypass_header");
                current.bypass_header = rate_limit.bypass_header;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.data_dir.is_some() {
                tracing::trace!(data_dir = ?database.data_dir, "Merging database.data_dir");
                current.data_dir = database.data_dir;
            }
            if database.cache_max_entries.is_some() {
                tracing::trace!(cache_max_entries = ?database.cache_max_entries, "Merging database.cache_max_entries");
                current.cache_max_entries = database.cache_max_entries;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Signing secret; a random per-process key is generated when absent
    pub jwt_secret: Option<String>,
    pub session_ttl_days: u32,
    pub secure_cookies: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("session_ttl_days", &self.session_ttl_days)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Rate limit configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per window per client IP
    pub max_requests: u32,
    pub window_secs: u64,
    pub bypass_header: Option<String>,
}

/// Database configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Explicit data directory; falls back to env var or platform default
    pub data_dir: Option<PathBuf>,
    pub cache_max_entries: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.leadbook/leadbook.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_sources(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            cors_origins = ?config.server.cors_origins,
            jwt_secret_configured = config.auth.jwt_secret.is_some(),
            session_ttl_days = config.auth.session_ttl_days,
            secure_cookies = config.auth.secure_cookies,
            rate_limit_enabled = config.rate_limit.enabled,
            rate_limit_max = config.rate_limit.max_requests,
            rate_limit_window_secs = config.rate_limit.window_secs,
            cache_max_entries = config.database.cache_max_entries,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_rate_limit = file_config.rate_limit.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);
        let cors_origins = cli
            .cors_origins
            .clone()
            .or(file_server.cors_origins)
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()])
            .into_iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let auth = AuthConfig {
            jwt_secret: cli
                .jwt_secret
                .clone()
                .or(file_auth.jwt_secret)
                .filter(|s| !s.is_empty()),
            session_ttl_days: file_auth
                .session_ttl_days
                .unwrap_or(DEFAULT_SESSION_TTL_DAYS),
            secure_cookies: cli
                .secure_cookies
                .or(file_auth.secure_cookies)
                .unwrap_or(false),
        };

        let rate_limit = RateLimitConfig {
            enabled: cli
                .rate_limit_enabled
                .or(file_rate_limit.enabled)
                .unwrap_or(true),
            max_requests: cli
                .rate_limit_max
                .or(file_rate_limit.max_requests)
                .unwrap_or(DEFAULT_RATE_LIMIT_MAX),
            window_secs: cli
                .rate_limit_window_secs
                .or(file_rate_limit.window_secs)
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            bypass_header: cli
                .rate_limit_bypass_header
                .clone()
                .or(file_rate_limit.bypass_header),
        };

        let database = DatabaseConfig {
            data_dir: file_database.data_dir.map(|d| expand_path(&d)),
            cache_max_entries: cli
                .cache_max_entries
                .or(file_database.cache_max_entries)
                .unwrap_or(DEFAULT_CACHE_MAX_ENTRIES),
        };

        Self {
            server: ServerConfig {
                host,
                port,
                cors_origins,
            },
            auth,
            rate_limit,
            database,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if let Some(ref secret) = self.auth.jwt_secret
            && secret.len() < MIN_JWT_SECRET_LEN
        {
            anyhow::bail!(
                "Configuration error: auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            );
        }

        if self.auth.session_ttl_days == 0 {
            anyhow::bail!("Configuration error: auth.session_ttl_days must be greater than 0");
        }

        if self.rate_limit.enabled && self.rate_limit.window_secs == 0 {
            anyhow::bail!("Configuration error: rate_limit.window_secs must be greater than 0");
        }

        if self.rate_limit.enabled && self.rate_limit.max_requests == 0 {
            tracing::warn!("rate_limit.max_requests is 0, all requests will be blocked");
        }

        if self.auth.secure_cookies && is_loopback(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Secure cookies enabled on a loopback host; browsers drop them without HTTPS"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.leadbook/leadbook.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "localhost" | "::1" | "[::1]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080, "cors_origins": ["https://crm.example"] },
            "auth": { "session_ttl_days": 3, "secure_cookies": true },
            "rate_limit": { "enabled": false, "max_requests": 50, "window_secs": 60 },
            "database": { "data_dir": "/var/lib/leadbook", "cache_max_entries": 500 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.cors_origins.unwrap(), vec!["https://crm.example"]);
        assert_eq!(config.auth.unwrap().session_ttl_days, Some(3));
        assert_eq!(config.rate_limit.unwrap().max_requests, Some(50));
        assert_eq!(config.database.unwrap().cache_max_entries, Some(500));
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 1 }, "mongo_uri": "mongodb://x" }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let extra = config.extra.as_object().unwrap();
        assert!(extra.contains_key("mongo_uri"));
        assert!(!extra.contains_key("server"));
    }

    #[test]
    fn test_file_config_merge() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("base.host".to_string()),
                port: Some(1000),
                cors_origins: None,
            }),
            auth: Some(AuthFileConfig {
                jwt_secret: None,
                session_ttl_days: Some(7),
                secure_cookies: Some(false),
            }),
            rate_limit: None,
            database: None,
            extra: serde_json::Value::Null,
        };

        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(2000),
                cors_origins: Some(vec!["https://crm.example".to_string()]),
            }),
            auth: Some(AuthFileConfig {
                jwt_secret: None,
                session_ttl_days: None,
                secure_cookies: Some(true),
            }),
            rate_limit: Some(RateLimitFileConfig {
                enabled: Some(false),
                ..Default::default()
            }),
            database: None,
            extra: serde_json::Value::Null,
        };

        base.merge(overlay);

        let server = base.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("base.host"));
        assert_eq!(server.port, Some(2000));
        assert_eq!(
            server.cors_origins.as_deref(),
            Some(&["https://crm.example".to_string()][..])
        );
        let auth = base.auth.as_ref().unwrap();
        assert_eq!(auth.session_ttl_days, Some(7));
        assert_eq!(auth.secure_cookies, Some(true));
        assert_eq!(base.rate_limit.as_ref().unwrap().enabled, Some(false));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_sources(&CliConfig::default(), FileConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.cors_origins, vec![DEFAULT_CORS_ORIGIN]);
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(config.auth.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let file = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("file.host".to_string()),
                port: Some(4000),
                cors_origins: Some(vec!["https://file.example/".to_string()]),
            }),
            rate_limit: Some(RateLimitFileConfig {
                max_requests: Some(10),
                window_secs: Some(60),
                ..Default::default()
            }),
            ..Default::default()
        };
        let cli = CliConfig {
            port: Some(3001),
            rate_limit_max: Some(20),
            ..Default::default()
        };

        let config = AppConfig::from_sources(&cli, file);

        assert_eq!(config.server.host, "file.host");
        assert_eq!(config.server.port, 3001);
        // Trailing slash is stripped so it matches the browser Origin header
        assert_eq!(config.server.cors_origins, vec!["https://file.example"]);
        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_validation_short_jwt_secret() {
        let cli = CliConfig {
            jwt_secret: Some("too-short".to_string()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));

        let cli = CliConfig {
            jwt_secret: Some("x".repeat(MIN_JWT_SECRET_LEN)),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_empty_jwt_secret_is_unset() {
        let cli = CliConfig {
            jwt_secret: Some(String::new()),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_app_config_validation_zero_window() {
        let cli = CliConfig {
            rate_limit_window_secs: Some(0),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.validate().is_err());

        // A disabled limiter ignores its window
        let cli = CliConfig {
            rate_limit_enabled: Some(false),
            rate_limit_window_secs: Some(0),
            ..Default::default()
        };
        let config = AppConfig::from_sources(&cli, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: Some("super-secret-value-that-is-long-enough".to_string()),
            session_ttl_days: 7,
            secure_cookies: false,
        };
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
