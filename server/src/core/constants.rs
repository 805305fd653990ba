// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Leadbook";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "leadbook";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".leadbook";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name (looked up in the current directory)
pub const CONFIG_FILE_NAME: &str = "leadbook.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LEADBOOK_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LEADBOOK_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LEADBOOK_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LEADBOOK_LOG";

/// Environment variable for extra allowed CORS origins (comma separated)
pub const ENV_CORS_ORIGINS: &str = "LEADBOOK_CORS_ORIGINS";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Origin of the dashboard dev server, allowed by default
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Maximum accepted request body (10 MB)
pub const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "LEADBOOK_DATA_DIR";

// =============================================================================
// Authentication
// =============================================================================

/// Environment variable for the JWT signing secret
pub const ENV_JWT_SECRET: &str = "LEADBOOK_JWT_SECRET";

/// Environment variable to mark session cookies `Secure`
pub const ENV_SECURE_COOKIES: &str = "LEADBOOK_SECURE_COOKIES";

/// Minimum accepted length of a configured JWT secret in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Cookie name for session token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Default session TTL in days
pub const DEFAULT_SESSION_TTL_DAYS: u32 = 7;

/// Minimum password length on registration
pub const MIN_PASSWORD_LEN: u64 = 6;

// =============================================================================
// SQLite Database
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "leadbook.db";

/// SQLite connection pool max connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 5;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

/// SQLite cache size (negative = KB, so -16000 = 16MB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

/// SQLite WAL auto-checkpoint threshold (pages, ~4MB at 1000)
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

/// WAL checkpoint interval in seconds (5 minutes)
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Cache
// =============================================================================

/// Environment variable for cache max entries
pub const ENV_CACHE_MAX_ENTRIES: &str = "LEADBOOK_CACHE_MAX_ENTRIES";

/// Default cache max entries
pub const DEFAULT_CACHE_MAX_ENTRIES: u64 = 10_000;

/// Cache key version (bump on schema changes to invalidate all cached data)
pub const CACHE_KEY_VERSION: &str = "v1";

/// Cache TTL for user profile (5 min)
pub const CACHE_TTL_USER: u64 = 300;

/// Cache TTL for negative (not-found) results (30 sec - short)
pub const CACHE_TTL_NEGATIVE: u64 = 30;

// =============================================================================
// Rate Limiting
// =============================================================================

/// Environment variable for rate limit enabled
pub const ENV_RATE_LIMIT_ENABLED: &str = "LEADBOOK_RATE_LIMIT_ENABLED";

/// Environment variable for requests allowed per window per IP
pub const ENV_RATE_LIMIT_MAX: &str = "LEADBOOK_RATE_LIMIT_MAX";

/// Environment variable for the rate limit window length
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "LEADBOOK_RATE_LIMIT_WINDOW_SECS";

/// Environment variable for rate limit bypass header secret
pub const ENV_RATE_LIMIT_BYPASS_HEADER: &str = "LEADBOOK_RATE_LIMIT_BYPASS_HEADER";

/// Default requests per window per IP
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

/// Default rate limit window in seconds (15 minutes)
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 900;
