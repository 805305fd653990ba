//! SQL filter builder
//!
//! Builds owner-scoped WHERE clauses from compiled expressions.
//! Includes column whitelists for sorting.

use super::types::{QueryExpression, SqlParams, SqlValue};

/// Build the WHERE clause for a principal's leads
///
/// The owner predicate always sits outside the compiled fragment, so nothing
/// inside the filter (including `$or` members) can widen the result set.
pub fn owner_scoped_where(owner_id: &str, expr: &QueryExpression, params: &mut SqlParams) -> String {
    params.values.push(SqlValue::Text(owner_id.to_string()));
    match expr.to_sql(params) {
        Some(fragment) => format!("created_by = ? AND ({})", fragment),
        None => "created_by = ?".to_string(),
    }
}

/// Column whitelists for different entities
pub mod columns {
    pub const LEAD_SORTABLE: &[&str] = &[
        "created_at",
        "updated_at",
        "last_activity_at",
        "first_name",
        "last_name",
        "email",
        "phone",
        "company",
        "city",
        "state",
        "source",
        "status",
        "score",
        "lead_value",
        "is_qualified",
    ];

    pub const LEAD_DEFAULT_SORT: &str = "created_at";

    /// Map a requested sort field onto a sortable lead column
    ///
    /// Unknown names fall back to [`LEAD_DEFAULT_SORT`].
    pub fn resolve_lead_sort(requested: &str) -> &'static str {
        match LEAD_SORTABLE.iter().find(|c| **c == requested) {
            Some(column) => column,
            None => {
                tracing::debug!(sort = requested, "Unknown sort field, using default");
                LEAD_DEFAULT_SORT
            }
        }
    }
}
