//! Lead repository for SQLite operations
//!
//! Every read and write is scoped to the owning user. A lead owned by someone
//! else is indistinguishable from a missing one.

use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::data::filters::{SqlParams, SqlValue, owner_scoped_where};
use crate::data::sqlite::SqliteError;
use crate::data::types::{LeadChanges, LeadRow, LeadSource, LeadStatus, ListLeadsParams, NewLead};
use crate::utils::sql::fold_case;

const LEAD_COLUMNS: &str = "id, created_by, first_name, last_name, email, phone, company, city, state, \
     source, status, score, lead_value, is_qualified, last_activity_at, created_at, updated_at";

const SEARCH_COLUMNS: &str = "first_name_search, last_name_search, email_search, \
     company_search, city_search, state_search";

pub const LEAD_EXISTS_MESSAGE: &str = "Lead with this email already exists";

fn lead_from_row(row: &SqliteRow) -> Result<LeadRow, sqlx::Error> {
    let source: String = row.try_get("source")?;
    let status: String = row.try_get("status")?;

    Ok(LeadRow {
        id: row.try_get("id")?,
        created_by: row.try_get("created_by")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        company: row.try_get("company")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        source: source.parse().unwrap_or_else(|_| {
            tracing::warn!(%source, "Unknown lead source in database");
            LeadSource::Other
        }),
        status: status.parse().unwrap_or_else(|_| {
            tracing::warn!(%status, "Unknown lead status in database");
            LeadStatus::default()
        }),
        score: row.try_get("score")?,
        lead_value: row.try_get("lead_value")?,
        is_qualified: row.try_get("is_qualified")?,
        last_activity_at: row.try_get("last_activity_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            SqlValue::Text(s) => query.bind(s.as_str()),
            SqlValue::Integer(i) => query.bind(*i),
            SqlValue::Real(f) => query.bind(*f),
        };
    }
    query
}

/// Insert a lead owned by `owner_id`
///
/// A duplicate email is reported as `SqliteError::Conflict`.
pub async fn create_lead(
    pool: &SqlitePool,
    owner_id: &str,
    lead: &NewLead,
) -> Result<LeadRow, SqliteError> {
    let id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(&format!(
        "INSERT INTO leads ({}, {}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        LEAD_COLUMNS, SEARCH_COLUMNS
    ))
    .bind(&id)
    .bind(owner_id)
    .bind(&lead.first_name)
    .bind(&lead.last_name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.company)
    .bind(&lead.city)
    .bind(&lead.state)
    .bind(lead.source.as_str())
    .bind(lead.status.as_str())
    .bind(lead.score)
    .bind(lead.lead_value)
    .bind(lead.is_qualified)
    .bind(lead.last_activity_at)
    .bind(now)
    .bind(now)
    .bind(fold_case(&lead.first_name))
    .bind(fold_case(&lead.last_name))
    .bind(fold_case(&lead.email))
    .bind(lead.company.as_deref().map(fold_case))
    .bind(lead.city.as_deref().map(fold_case))
    .bind(lead.state.as_deref().map(fold_case))
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, LEAD_EXISTS_MESSAGE))?;

    tracing::debug!(%id, %owner_id, "Lead created");

    Ok(LeadRow {
        id,
        created_by: owner_id.to_string(),
        first_name: lead.first_name.clone(),
        last_name: lead.last_name.clone(),
        email: lead.email.clone(),
        phone: lead.phone.clone(),
        company: lead.company.clone(),
        city: lead.city.clone(),
        state: lead.state.clone(),
        source: lead.source,
        status: lead.status,
        score: lead.score,
        lead_value: lead.lead_value,
        is_qualified: lead.is_qualified,
        last_activity_at: lead.last_activity_at,
        created_at: now,
        updated_at: now,
    })
}

/// Get a lead by ID if it belongs to `owner_id`
pub async fn get_lead(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
) -> Result<Option<LeadRow>, SqliteError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM leads WHERE id = ? AND created_by = ?",
        LEAD_COLUMNS
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(lead_from_row).transpose()?)
}

/// List one page of a principal's leads plus the total match count
///
/// The count and the page fetch run concurrently; the first failure wins.
pub async fn list_leads(
    pool: &SqlitePool,
    params: &ListLeadsParams,
) -> Result<(Vec<LeadRow>, u64), SqliteError> {
    let mut sql_params = SqlParams::default();
    let where_clause = owner_scoped_where(&params.owner_id, &params.filter, &mut sql_params);
    let direction = params.direction.as_sql();

    let count_sql = format!("SELECT COUNT(*) FROM leads WHERE {}", where_clause);
    let page_sql = format!(
        "SELECT {} FROM leads WHERE {} ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
        LEAD_COLUMNS, where_clause, params.sort_column, direction, direction
    );

    let limit = i64::from(params.limit);
    let offset = i64::try_from(params.offset()).unwrap_or(i64::MAX);

    let count = async {
        bind_values(sqlx::query(&count_sql), &sql_params.values)
            .fetch_one(pool)
            .await
            .and_then(|row| row.try_get::<i64, _>(0))
    };
    let page = async {
        bind_values(sqlx::query(&page_sql), &sql_params.values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    };

    let (total, rows) = tokio::try_join!(count, page)?;
    let leads = rows
        .iter()
        .map(lead_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!(
        owner_id = %params.owner_id,
        total,
        returned = leads.len(),
        "Listed leads"
    );

    Ok((leads, total.max(0) as u64))
}

/// Apply a partial update to a lead owned by `owner_id`
///
/// Returns `None` when the lead does not exist for this owner. A duplicate
/// email is reported as `SqliteError::Conflict`.
pub async fn update_lead(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    changes: &LeadChanges,
) -> Result<Option<LeadRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE leads SET updated_at = ");
    qb.push_bind(now);

    if let Some(v) = &changes.first_name {
        qb.push(", first_name = ").push_bind(v);
        qb.push(", first_name_search = ").push_bind(fold_case(v));
    }
    if let Some(v) = &changes.last_name {
        qb.push(", last_name = ").push_bind(v);
        qb.push(", last_name_search = ").push_bind(fold_case(v));
    }
    if let Some(v) = &changes.email {
        qb.push(", email = ").push_bind(v);
        qb.push(", email_search = ").push_bind(fold_case(v));
    }
    if let Some(v) = &changes.phone {
        qb.push(", phone = ").push_bind(v);
    }
    if let Some(v) = &changes.company {
        qb.push(", company = ").push_bind(v);
        qb.push(", company_search = ")
            .push_bind(v.as_deref().map(fold_case));
    }
    if let Some(v) = &changes.city {
        qb.push(", city = ").push_bind(v);
        qb.push(", city_search = ")
            .push_bind(v.as_deref().map(fold_case));
    }
    if let Some(v) = &changes.state {
        qb.push(", state = ").push_bind(v);
        qb.push(", state_search = ")
            .push_bind(v.as_deref().map(fold_case));
    }
    if let Some(v) = changes.source {
        qb.push(", source = ").push_bind(v.as_str());
    }
    if let Some(v) = changes.status {
        qb.push(", status = ").push_bind(v.as_str());
    }
    if let Some(v) = changes.score {
        qb.push(", score = ").push_bind(v);
    }
    if let Some(v) = changes.lead_value {
        qb.push(", lead_value = ").push_bind(v);
    }
    if let Some(v) = changes.is_qualified {
        qb.push(", is_qualified = ").push_bind(v);
    }
    if let Some(v) = changes.last_activity_at {
        qb.push(", last_activity_at = ").push_bind(v);
    }

    qb.push(" WHERE id = ")
        .push_bind(id)
        .push(" AND created_by = ")
        .push_bind(owner_id)
        .push(" RETURNING ")
        .push(LEAD_COLUMNS);

    let row = qb
        .build()
        .fetch_optional(pool)
        .await
        .map_err(|e| SqliteError::from_write(e, LEAD_EXISTS_MESSAGE))?;

    Ok(row.as_ref().map(lead_from_row).transpose()?)
}

/// Delete a lead owned by `owner_id`; returns whether a row was removed
pub async fn delete_lead(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM leads WHERE id = ? AND created_by = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
