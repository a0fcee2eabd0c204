//! API endpoint handlers, one module per feature.

pub mod assessments;
pub mod chat;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod import;
pub mod predict;
