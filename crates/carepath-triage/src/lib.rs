//! carepath-triage — Rule-based triage decision engine.
//!
//! Scores every specialty in a knowledge base against the reported symptoms,
//! evaluates named escalation rules, and derives an urgency level.

pub mod engine;
pub mod knowledge_base;
pub mod rules;
pub mod scorer;
pub mod selection;

pub use engine::{TriageEngine, UrgencyPolicy};
pub use knowledge_base::{KnowledgeBase, Specialty, Symptom, SymptomWeight};
pub use rules::Rule;
