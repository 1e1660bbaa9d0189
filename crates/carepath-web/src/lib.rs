//! carepath-web — HTTP surface for CarePath triage.
//!
//! Exposes:
//!   - Rule-based recommendations and the knowledge-base vocabulary
//!   - Classifier predictions, advice and symptom chips (when a model is loaded)
//!   - A health probe
//!   - `TriageClient`, a remote caller that falls back to the local engine

pub mod client;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod validation;
