//! User repository for SQLite operations
//!
//! `get_user` supports optional caching. Pass `Some(cache)` to enable caching,
//! or `None` to bypass cache. Creating a user clears its negative cache entry.

use std::time::Duration;

use sqlx::SqlitePool;

use crate::core::constants::{CACHE_TTL_NEGATIVE, CACHE_TTL_USER};
use crate::data::cache::{CacheKey, CacheService};
use crate::data::sqlite::SqliteError;
use crate::data::types::{NewUser, UserRow};

type UserTuple = (String, String, String, String, String, i64, i64);

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, created_at, updated_at";

pub const USER_EXISTS_MESSAGE: &str = "User with this email already exists";

fn user_from_tuple(
    (id, email, first_name, last_name, password_hash, created_at, updated_at): UserTuple,
) -> UserRow {
    UserRow {
        id,
        email,
        first_name,
        last_name,
        password_hash,
        created_at,
        updated_at,
    }
}

/// Create a new user with a generated CUID2 ID
///
/// A taken email is reported as `SqliteError::Conflict`.
pub async fn create_user(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    new_user: &NewUser<'_>,
) -> Result<UserRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(new_user.email)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .bind(new_user.password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, USER_EXISTS_MESSAGE))?;

    if let Some(cache) = cache {
        cache.invalidate_key(&CacheKey::user_negative(&id)).await;
    }

    Ok(UserRow {
        id,
        email: new_user.email.to_string(),
        first_name: new_user.first_name.to_string(),
        last_name: new_user.last_name.to_string(),
        password_hash: new_user.password_hash.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Get a user by ID (with optional caching)
pub async fn get_user(
    pool: &SqlitePool,
    cache: Option<&CacheService>,
    id: &str,
) -> Result<Option<UserRow>, SqliteError> {
    let Some(cache) = cache else {
        return get_user_from_db(pool, id).await;
    };

    let key = CacheKey::user(id);
    let neg_key = CacheKey::user_negative(id);

    match cache.get::<UserRow>(&key).await {
        Ok(Some(user)) => {
            tracing::trace!(%id, "User cache hit");
            return Ok(Some(user));
        }
        Err(e) => tracing::warn!(%id, error = %e, "Cache get error"),
        Ok(None) => {}
    }

    if cache.exists(&neg_key).await.unwrap_or(false) {
        tracing::trace!(%id, "User negative cache hit");
        return Ok(None);
    }

    let result = get_user_from_db(pool, id).await?;

    let stored = match &result {
        Some(user) => {
            cache
                .set(&key, user, Some(Duration::from_secs(CACHE_TTL_USER)))
                .await
        }
        None => {
            cache
                .set_raw(
                    &neg_key,
                    vec![],
                    Some(Duration::from_secs(CACHE_TTL_NEGATIVE)),
                )
                .await
        }
    };
    if let Err(e) = stored {
        tracing::warn!(%id, error = %e, "Cache set error");
    }

    Ok(result)
}

async fn get_user_from_db(pool: &SqlitePool, id: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(user_from_tuple))
}

/// Get a user by (lower-cased) email
///
/// Never cached: the row carries the password hash used for login.
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(user_from_tuple))
}
