//! SQLite repositories
//!
//! Row types (UserRow, LeadRow, etc.) live in `crate::data::types`.

pub mod lead;
pub mod user;

pub use lead::{LEAD_EXISTS_MESSAGE, create_lead, delete_lead, get_lead, list_leads, update_lead};
pub use user::{USER_EXISTS_MESSAGE, create_user, get_by_email, get_user};
