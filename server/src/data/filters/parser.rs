//! Filter parsing
//!
//! Compiles a JSON filter description into a [`QueryExpression`].
//! Compilation is permissive: unknown fields, malformed operator objects and
//! values of the wrong shape are dropped rather than reported.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::api::types::ApiError;

use super::types::{
    BooleanField, Condition, DateField, DateOp, EnumField, EnumOp, NumericField, NumericOp,
    QueryExpression, TextField, TextOp,
};

/// Maximum size of filter JSON in bytes (64KB)
const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Key holding the disjunction list
const OR_KEY: &str = "$or";

/// Parse and compile the `filters` query parameter
///
/// Only transport problems (oversized or unparseable JSON) are errors.
/// A blank parameter compiles to the empty expression.
pub fn parse_filter_json(json_str: &str) -> Result<QueryExpression, ApiError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(ApiError::bad_request(
            "FILTER_JSON_TOO_LARGE",
            format!(
                "Filter JSON exceeds maximum size of {} bytes",
                MAX_FILTER_JSON_SIZE
            ),
        ));
    }

    if json_str.trim().is_empty() {
        return Ok(QueryExpression::default());
    }

    let spec: Value = serde_json::from_str(json_str)
        .map_err(|e| ApiError::bad_request("INVALID_FILTER_JSON", e.to_string()))?;

    Ok(compile(&spec))
}

/// Compile a filter description
///
/// Non-objects compile to the empty expression. Each `$or` member is compiled
/// with the same per-field grammar as the top level; nested `$or` keys are
/// ignored and members yielding no condition are dropped.
pub fn compile(spec: &Value) -> QueryExpression {
    let Some(obj) = spec.as_object() else {
        return QueryExpression::default();
    };

    let any_of = obj
        .get(OR_KEY)
        .and_then(Value::as_array)
        .map(|members| {
            members
                .iter()
                .filter_map(Value::as_object)
                .map(compile_fields)
                .filter(|group| !group.is_empty())
                .collect()
        })
        .unwrap_or_default();

    QueryExpression {
        conditions: compile_fields(obj),
        any_of,
    }
}

/// Compile the field-level conditions of one object, in field taxonomy order
fn compile_fields(obj: &Map<String, Value>) -> Vec<Condition> {
    let mut conditions = Vec::new();

    for field in TextField::ALL {
        if let Some(op) = operators(obj, field.as_str()).and_then(text_op) {
            conditions.push(Condition::Text { field, op });
        }
    }

    for field in EnumField::ALL {
        if let Some(op) = operators(obj, field.as_str()).and_then(enum_op) {
            conditions.push(Condition::Enum { field, op });
        }
    }

    for field in NumericField::ALL {
        if let Some(op) = operators(obj, field.as_str()).and_then(numeric_op) {
            conditions.push(Condition::Numeric { field, op });
        }
    }

    for field in DateField::ALL {
        if let Some(op) = operators(obj, field.as_str()).and_then(date_op) {
            conditions.push(Condition::Date { field, op });
        }
    }

    for field in BooleanField::ALL {
        if let Some(value) = obj.get(field.as_str()).and_then(as_bool) {
            conditions.push(Condition::Boolean { field, value });
        }
    }

    conditions
}

fn operators<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Map<String, Value>> {
    obj.get(field).and_then(Value::as_object)
}

fn text_op(ops: &Map<String, Value>) -> Option<TextOp> {
    // `$regex` is accepted as a literal alias of `contains`; `$options` is ignored
    ops.get("contains")
        .or_else(|| ops.get("$regex"))
        .and_then(as_text)
        .map(|s| TextOp::Contains(s.to_string()))
        .or_else(|| {
            ops.get("equals")
                .and_then(as_text)
                .map(|s| TextOp::Equals(s.to_string()))
        })
}

fn enum_op(ops: &Map<String, Value>) -> Option<EnumOp> {
    let members: Vec<String> = ops
        .get("in")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(as_text)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if !members.is_empty() {
        return Some(EnumOp::In(members));
    }

    ops.get("equals")
        .and_then(as_text)
        .map(|s| EnumOp::Equals(s.to_string()))
}

fn numeric_op(ops: &Map<String, Value>) -> Option<NumericOp> {
    if let Some((low, high)) = ops.get("between").and_then(|v| pair(v, as_number)) {
        return Some(NumericOp::Between(low, high));
    }
    if let Some(v) = ops.get("gt").and_then(as_number) {
        return Some(NumericOp::Gt(v));
    }
    if let Some(v) = ops.get("lt").and_then(as_number) {
        return Some(NumericOp::Lt(v));
    }
    ops.get("equals").and_then(as_number).map(NumericOp::Equals)
}

fn date_op(ops: &Map<String, Value>) -> Option<DateOp> {
    if let Some((start, end)) = ops.get("between").and_then(|v| pair(v, as_datetime)) {
        return Some(DateOp::Between(start, end));
    }
    if let Some(dt) = ops.get("before").and_then(as_datetime) {
        return Some(DateOp::Before(dt));
    }
    if let Some(dt) = ops.get("after").and_then(as_datetime) {
        return Some(DateOp::After(dt));
    }
    ops.get("on").and_then(as_datetime).map(DateOp::On)
}

/// Exactly two elements, both coercible
fn pair<T>(value: &Value, coerce: impl Fn(&Value) -> Option<T>) -> Option<(T, T)> {
    match value.as_array()?.as_slice() {
        [a, b] => Some((coerce(a)?, coerce(b)?)),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

/// RFC 3339, `YYYY-MM-DD` (UTC midnight), offset-less datetime (UTC) or epoch millis
fn as_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn compile_non_object_is_empty() {
        assert!(compile(&json!(null)).is_empty());
        assert!(compile(&json!([1, 2])).is_empty());
        assert!(compile(&json!("status")).is_empty());
        assert!(compile(&json!({})).is_empty());
    }

    #[test]
    fn compile_ignores_unknown_fields_and_malformed_operators() {
        let expr = compile(&json!({
            "password_hash": {"equals": "x"},
            "created_by": {"equals": "someone-else"},
            "email": "not-an-operator-object",
            "company": {"startsWith": "Ac"},
            "score": {"gt": "abc"},
        }));
        assert!(expr.is_empty());
    }

    #[test]
    fn text_contains_beats_equals() {
        let expr = compile(&json!({"company": {"contains": "acme", "equals": "Acme Inc"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Text {
                field: TextField::Company,
                op: TextOp::Contains("acme".to_string()),
            }]
        );
    }

    #[test]
    fn text_empty_contains_falls_through_to_equals() {
        let expr = compile(&json!({"city": {"contains": "", "equals": "Oslo"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Text {
                field: TextField::City,
                op: TextOp::Equals("Oslo".to_string()),
            }]
        );
    }

    #[test]
    fn text_regex_is_literal_contains() {
        let expr = compile(&json!({"email": {"$regex": "a.*b", "$options": "i"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Text {
                field: TextField::Email,
                op: TextOp::Contains("a.*b".to_string()),
            }]
        );
    }

    #[test]
    fn enum_in_beats_equals() {
        let expr = compile(&json!({"status": {"in": ["new", "won"], "equals": "lost"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Enum {
                field: EnumField::Status,
                op: EnumOp::In(vec!["new".to_string(), "won".to_string()]),
            }]
        );
    }

    #[test]
    fn enum_empty_in_falls_through_to_equals() {
        let expr = compile(&json!({"source": {"in": [], "equals": "referral"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Enum {
                field: EnumField::Source,
                op: EnumOp::Equals("referral".to_string()),
            }]
        );

        let expr = compile(&json!({"source": {"in": [1, null]}}));
        assert!(expr.is_empty());
    }

    #[test]
    fn numeric_priority_order() {
        let expr = compile(&json!({"score": {"between": [50, 80], "gt": 10, "lt": 90, "equals": 5}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Numeric {
                field: NumericField::Score,
                op: NumericOp::Between(50.0, 80.0),
            }]
        );

        let expr = compile(&json!({"score": {"between": [50], "gt": 10, "lt": 90}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Numeric {
                field: NumericField::Score,
                op: NumericOp::Gt(10.0),
            }]
        );

        let expr = compile(&json!({"lead_value": {"lt": "99.5", "equals": 1}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Numeric {
                field: NumericField::LeadValue,
                op: NumericOp::Lt(99.5),
            }]
        );
    }

    #[test]
    fn numeric_zero_is_a_value() {
        let expr = compile(&json!({"score": {"gt": 0}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Numeric {
                field: NumericField::Score,
                op: NumericOp::Gt(0.0),
            }]
        );
    }

    #[test]
    fn date_priority_order_and_formats() {
        let expr = compile(&json!({
            "created_at": {"between": ["2024-01-01", "2024-01-31T12:00:00Z"], "before": "2023-01-01"}
        }));
        assert_eq!(
            expr.conditions,
            vec![Condition::Date {
                field: DateField::CreatedAt,
                op: DateOp::Between(
                    utc(2024, 1, 1),
                    Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap()
                ),
            }]
        );

        let expr = compile(&json!({
            "last_activity_at": {"before": "garbage", "after": "2024-02-03T04:05:06", "on": "2024-01-01"}
        }));
        assert_eq!(
            expr.conditions,
            vec![Condition::Date {
                field: DateField::LastActivityAt,
                op: DateOp::After(Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap()),
            }]
        );

        let expr = compile(&json!({"created_at": {"on": 1_705_276_800_000_i64}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Date {
                field: DateField::CreatedAt,
                op: DateOp::On(utc(2024, 1, 15)),
            }]
        );
    }

    #[test]
    fn date_rfc3339_offset_is_normalized() {
        let expr = compile(&json!({"created_at": {"before": "2024-01-15T02:00:00+02:00"}}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Date {
                field: DateField::CreatedAt,
                op: DateOp::Before(utc(2024, 1, 15)),
            }]
        );
    }

    #[test]
    fn boolean_false_is_a_condition() {
        let expr = compile(&json!({"is_qualified": false}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Boolean {
                field: BooleanField::IsQualified,
                value: false,
            }]
        );

        let expr = compile(&json!({"is_qualified": "true"}));
        assert_eq!(
            expr.conditions,
            vec![Condition::Boolean {
                field: BooleanField::IsQualified,
                value: true,
            }]
        );

        assert!(compile(&json!({"is_qualified": null})).is_empty());
        assert!(compile(&json!({"is_qualified": 1})).is_empty());
    }

    #[test]
    fn conditions_follow_field_order() {
        let expr = compile(&json!({
            "is_qualified": true,
            "score": {"gt": 1},
            "status": {"equals": "new"},
            "first_name": {"equals": "Ada"},
            "email": {"contains": "@"},
            "created_at": {"on": "2024-01-01"},
        }));
        let fields: Vec<&str> = expr
            .conditions
            .iter()
            .map(|c| match c {
                Condition::Text { field, .. } => field.as_str(),
                Condition::Enum { field, .. } => field.as_str(),
                Condition::Numeric { field, .. } => field.as_str(),
                Condition::Date { field, .. } => field.as_str(),
                Condition::Boolean { field, .. } => field.as_str(),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "email",
                "first_name",
                "status",
                "score",
                "created_at",
                "is_qualified"
            ]
        );
    }

    #[test]
    fn or_members_use_field_grammar() {
        let expr = compile(&json!({
            "$or": [
                {"email": {"$regex": "ada", "$options": "i"}},
                {"first_name": {"$regex": "ada", "$options": "i"}},
                {"created_by": "other-user"},
                {"$or": [{"city": {"equals": "Oslo"}}]},
                "not an object",
            ]
        }));

        assert!(expr.conditions.is_empty());
        assert_eq!(
            expr.any_of,
            vec![
                vec![Condition::Text {
                    field: TextField::Email,
                    op: TextOp::Contains("ada".to_string()),
                }],
                vec![Condition::Text {
                    field: TextField::FirstName,
                    op: TextOp::Contains("ada".to_string()),
                }],
            ]
        );
    }

    #[test]
    fn or_without_surviving_members_is_dropped() {
        assert!(compile(&json!({"$or": []})).is_empty());
        assert!(compile(&json!({"$or": [{}, {"nope": 1}]})).is_empty());
        assert!(compile(&json!({"$or": {"email": {"equals": "a@b.c"}}})).is_empty());
    }

    #[test]
    fn compile_is_idempotent() {
        let spec = json!({
            "status": {"in": ["new", "contacted"]},
            "score": {"between": [10, "90"]},
            "created_at": {"after": "2024-01-01"},
            "is_qualified": false,
            "$or": [{"company": {"contains": "acme"}}, {"city": {"equals": "Oslo"}}],
        });
        assert_eq!(compile(&spec), compile(&spec));
    }

    #[test]
    fn parse_filter_json_valid() {
        let expr = parse_filter_json(r#"{"is_qualified": true}"#).unwrap();
        assert_eq!(expr.conditions.len(), 1);
    }

    #[test]
    fn parse_filter_json_blank_is_empty() {
        assert!(parse_filter_json("").unwrap().is_empty());
        assert!(parse_filter_json("   ").unwrap().is_empty());
    }

    #[test]
    fn parse_filter_json_invalid_json() {
        let err = parse_filter_json("{not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref code, .. } if code == "INVALID_FILTER_JSON"));
    }

    #[test]
    fn parse_filter_json_too_large() {
        let json = format!(r#"{{"email": {{"contains": "{}"}}}}"#, "a".repeat(MAX_FILTER_JSON_SIZE));
        let err = parse_filter_json(&json).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { ref code, .. } if code == "FILTER_JSON_TOO_LARGE"));
    }
}
