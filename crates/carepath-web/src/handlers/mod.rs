//! HTTP handlers for all routes.

pub mod classifier;
pub mod health;
pub mod triage;
