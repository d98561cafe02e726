//! API endpoint handlers. One module per resource.

pub mod dashboard;
pub mod health;
