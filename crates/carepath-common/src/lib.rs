//! carepath-common — Shared request/response types, errors, and configuration
//! used across all CarePath crates.

pub mod config;
pub mod entities;
pub mod error;

// Re-export commonly used types
pub use config::Config;
pub use entities::{
    Onset, PatientContext, Severity, Sex, SpecialtyScore, SymptomInput, TriageAdvice,
    TriageRequest, TriageResponse, UrgencyLevel,
};
pub use error::{Result, TriageError};
