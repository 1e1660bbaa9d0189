//! carepath-classifier — Pretrained one-vs-rest linear classifier.
//!
//! Scores a fixed feature vocabulary (symptom presence bits, normalised age,
//! coded sex) with exported weights and a softmax. Independent of the
//! rule-based engine: it uses its own symptom vocabulary and emits its own
//! class labels.

pub mod advisory;
pub mod error;
pub mod model;
pub mod vocab;

pub use advisory::ClassifierAdvisor;
pub use error::ClassifierError;
pub use model::{softmax, ClassifierInput, ClassifierModel, Prediction, DEFAULT_TOP_K};
pub use vocab::{normalize_symptoms, symptom_chips, NormalizedSymptoms, SymptomChip};
