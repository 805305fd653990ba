//! Lead filter system
//!
//! Compiles client-supplied JSON filter descriptions into typed expressions
//! and renders them as parameterised SQL for the leads table.
//! Supports text, enum, numeric, date and boolean fields plus an `$or` list.
//!
//! ## Usage
//!
//! ```
//! use leadbook_server::data::filters::{SqlParams, compile, owner_scoped_where};
//!
//! let spec = serde_json::json!({"score": {"between": [50, 80]}});
//! let expr = compile(&spec);
//! let mut params = SqlParams::default();
//! let sql = owner_scoped_where("user_1", &expr, &mut params);
//! assert_eq!(sql, "created_by = ? AND (score >= ? AND score <= ?)");
//! assert_eq!(params.values.len(), 3);
//! ```

mod builder;
mod parser;
mod types;

pub use builder::{columns, owner_scoped_where};
pub use parser::{compile, parse_filter_json};
pub use types::{
    BooleanField, Condition, DateField, DateOp, EnumField, EnumOp, NumericField, NumericOp,
    QueryExpression, SortDirection, SqlParams, SqlValue, TextField, TextOp,
};
