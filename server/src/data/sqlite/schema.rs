//! SQLite schema definitions
//!
//! Initial schema with all tables. Later changes go through
//! versioned migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1 AND length(first_name) <= 100),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1 AND length(last_name) <= 100),
    password_hash TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- =============================================================================
-- 2. Leads (references users)
-- =============================================================================
CREATE TABLE IF NOT EXISTS leads (
    id TEXT PRIMARY KEY,
    created_by TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    first_name TEXT NOT NULL CHECK(length(first_name) >= 1),
    last_name TEXT NOT NULL CHECK(length(last_name) >= 1),
    email TEXT NOT NULL UNIQUE CHECK(length(email) >= 3),
    phone TEXT,
    company TEXT,
    city TEXT,
    state TEXT,
    source TEXT NOT NULL CHECK(source IN ('website', 'facebook_ads', 'google_ads', 'referral', 'events', 'other')),
    status TEXT NOT NULL DEFAULT 'new' CHECK(status IN ('new', 'contacted', 'qualified', 'lost', 'won')),
    score INTEGER NOT NULL DEFAULT 0 CHECK(score >= 0 AND score <= 100),
    lead_value REAL NOT NULL DEFAULT 0 CHECK(lead_value >= 0),
    last_activity_at INTEGER,
    is_qualified INTEGER NOT NULL DEFAULT 0 CHECK(is_qualified IN (0, 1)),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    -- Unicode-lowercased copies written by the application; `contains`
    -- filters match against these because SQLite LIKE only folds ASCII
    first_name_search TEXT NOT NULL DEFAULT '',
    last_name_search TEXT NOT NULL DEFAULT '',
    email_search TEXT NOT NULL DEFAULT '',
    company_search TEXT,
    city_search TEXT,
    state_search TEXT
);

CREATE INDEX IF NOT EXISTS idx_leads_owner_created ON leads(created_by, created_at);
CREATE INDEX IF NOT EXISTS idx_leads_owner_status ON leads(created_by, status);
CREATE INDEX IF NOT EXISTS idx_leads_owner_source ON leads(created_by, source);
CREATE INDEX IF NOT EXISTS idx_leads_owner_score ON leads(created_by, score);
CREATE INDEX IF NOT EXISTS idx_leads_owner_activity ON leads(created_by, last_activity_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = ["schema_version", "schema_migrations", "users", "leads"];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_has_search_column_per_text_field() {
        use crate::data::filters::TextField;

        for field in TextField::ALL {
            assert!(
                SCHEMA.contains(&format!("{} TEXT", field.search_column())),
                "Schema missing search column for {}",
                field.as_str()
            );
        }
    }

    #[test]
    fn test_schema_enum_checks_match_types() {
        use crate::data::types::{LeadSource, LeadStatus};

        for source in LeadSource::ALL {
            assert!(SCHEMA.contains(&format!("'{}'", source.as_str())));
        }
        for status in LeadStatus::ALL {
            assert!(SCHEMA.contains(&format!("'{}'", status.as_str())));
        }
    }
}
