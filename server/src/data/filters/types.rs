//! Filter type definitions
//!
//! A compiled filter is a closed, typed tree: every field is an enum variant
//! mapped to a fixed column, and every operator carries already-coerced
//! values. Rendering to SQL only ever emits whitelisted column names and
//! `?` placeholders.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::utils::sql::{escape_like_pattern, fold_case, placeholders};

/// Free-text columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Email,
    Company,
    City,
    State,
    FirstName,
    LastName,
}

impl TextField {
    pub const ALL: [TextField; 6] = [
        Self::Email,
        Self::Company,
        Self::City,
        Self::State,
        Self::FirstName,
        Self::LastName,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Company => "company",
            Self::City => "city",
            Self::State => "state",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
        }
    }

    /// Case-folded shadow column that `contains` matches against
    pub const fn search_column(&self) -> &'static str {
        match self {
            Self::Email => "email_search",
            Self::Company => "company_search",
            Self::City => "city_search",
            Self::State => "state_search",
            Self::FirstName => "first_name_search",
            Self::LastName => "last_name_search",
        }
    }
}

/// Closed-vocabulary columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumField {
    Status,
    Source,
}

impl EnumField {
    pub const ALL: [EnumField; 2] = [Self::Status, Self::Source];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Source => "source",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Score,
    LeadValue,
}

impl NumericField {
    pub const ALL: [NumericField; 2] = [Self::Score, Self::LeadValue];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::LeadValue => "lead_value",
        }
    }
}

/// Timestamp columns, stored as unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    CreatedAt,
    LastActivityAt,
}

impl DateField {
    pub const ALL: [DateField; 2] = [Self::CreatedAt, Self::LastActivityAt];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::LastActivityAt => "last_activity_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanField {
    IsQualified,
}

impl BooleanField {
    pub const ALL: [BooleanField; 1] = [Self::IsQualified];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IsQualified => "is_qualified",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextOp {
    /// Case-insensitive substring match
    Contains(String),
    Equals(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumOp {
    In(Vec<String>),
    Equals(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericOp {
    /// Inclusive on both ends
    Between(f64, f64),
    Gt(f64),
    Lt(f64),
    Equals(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DateOp {
    /// Inclusive on both ends
    Between(DateTime<Utc>, DateTime<Utc>),
    Before(DateTime<Utc>),
    After(DateTime<Utc>),
    /// `[date, date + 1 day)`
    On(DateTime<Utc>),
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Text { field: TextField, op: TextOp },
    Enum { field: EnumField, op: EnumOp },
    Numeric { field: NumericField, op: NumericOp },
    Date { field: DateField, op: DateOp },
    Boolean { field: BooleanField, value: bool },
}

/// Compiled filter: `conditions` are ANDed, `any_of` is an OR of AND-groups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExpression {
    pub conditions: Vec<Condition>,
    pub any_of: Vec<Vec<Condition>>,
}

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A bound SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

/// Dates are compared against integer unix-second columns; binding fractional
/// seconds keeps sub-second bounds exact.
fn epoch_seconds(dt: &DateTime<Utc>) -> SqlValue {
    SqlValue::Real(dt.timestamp_millis() as f64 / 1000.0)
}

impl Condition {
    /// Generate SQL WHERE clause fragment
    /// Returns the SQL clause with ? placeholders and updates params
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        match self {
            Self::Text { field, op } => match op {
                TextOp::Contains(value) => {
                    let escaped = escape_like_pattern(&fold_case(value));
                    params.values.push(SqlValue::Text(format!("%{}%", escaped)));
                    format!("{} LIKE ? ESCAPE '\\'", field.search_column())
                }
                TextOp::Equals(value) => {
                    params.values.push(SqlValue::Text(value.clone()));
                    format!("{} = ?", field.as_str())
                }
            },
            Self::Enum { field, op } => {
                let col = field.as_str();
                match op {
                    EnumOp::In(values) => {
                        params
                            .values
                            .extend(values.iter().cloned().map(SqlValue::Text));
                        format!("{} IN ({})", col, placeholders(values.len()))
                    }
                    EnumOp::Equals(value) => {
                        params.values.push(SqlValue::Text(value.clone()));
                        format!("{} = ?", col)
                    }
                }
            }
            Self::Numeric { field, op } => {
                let col = field.as_str();
                match op {
                    NumericOp::Between(low, high) => {
                        params.values.push(SqlValue::Real(*low));
                        params.values.push(SqlValue::Real(*high));
                        format!("{} >= ? AND {} <= ?", col, col)
                    }
                    NumericOp::Gt(v) => {
                        params.values.push(SqlValue::Real(*v));
                        format!("{} > ?", col)
                    }
                    NumericOp::Lt(v) => {
                        params.values.push(SqlValue::Real(*v));
                        format!("{} < ?", col)
                    }
                    NumericOp::Equals(v) => {
                        params.values.push(SqlValue::Real(*v));
                        format!("{} = ?", col)
                    }
                }
            }
            Self::Date { field, op } => {
                let col = field.as_str();
                match op {
                    DateOp::Between(start, end) => {
                        params.values.push(epoch_seconds(start));
                        params.values.push(epoch_seconds(end));
                        format!("{} >= ? AND {} <= ?", col, col)
                    }
                    DateOp::Before(dt) => {
                        params.values.push(epoch_seconds(dt));
                        format!("{} < ?", col)
                    }
                    DateOp::After(dt) => {
                        params.values.push(epoch_seconds(dt));
                        format!("{} > ?", col)
                    }
                    DateOp::On(day) => {
                        params.values.push(epoch_seconds(day));
                        params.values.push(epoch_seconds(&(*day + Duration::days(1))));
                        format!("{} >= ? AND {} < ?", col, col)
                    }
                }
            }
            Self::Boolean { field, value } => {
                params.values.push(SqlValue::Integer(i64::from(*value)));
                format!("{} = ?", field.as_str())
            }
        }
    }
}

fn conjunction(conditions: &[Condition], params: &mut SqlParams) -> String {
    conditions
        .iter()
        .map(|c| c.to_sql(params))
        .collect::<Vec<_>>()
        .join(" AND ")
}

impl QueryExpression {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.any_of.is_empty()
    }

    /// Render the expression as a WHERE fragment, or `None` when it matches everything
    pub fn to_sql(&self, params: &mut SqlParams) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::with_capacity(2);
        if !self.conditions.is_empty() {
            parts.push(conjunction(&self.conditions, params));
        }
        if !self.any_of.is_empty() {
            let groups: Vec<String> = self
                .any_of
                .iter()
                .map(|group| format!("({})", conjunction(group, params)))
                .collect();
            parts.push(format!("({})", groups.join(" OR ")));
        }

        Some(parts.join(" AND "))
    }
}
