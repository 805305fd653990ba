//! Shared data types for the transactional store

mod enums;
mod transactional;

pub use enums::{LeadSource, LeadStatus};
pub use transactional::{LeadChanges, LeadRow, ListLeadsParams, NewLead, NewUser, UserRow};
