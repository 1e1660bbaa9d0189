//! Classifier endpoints. All of them answer 503 when no model is loaded.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carepath_classifier::{normalize_symptoms, symptom_chips, ClassifierAdvisor, ClassifierInput, Prediction, SymptomChip};
use carepath_common::{TriageRequest, TriageResponse};

use crate::error::ApiError;
use crate::state::SharedState;
use crate::validation::{validate_classifier_request, validate_triage_request};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRequest {
    pub age: f64,
    #[serde(default)]
    pub sex: Option<String>,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierResponse {
    pub predictions: Vec<Prediction>,
    pub recognized: Vec<String>,
    pub unknown: Vec<String>,
}

fn advisor(state: &SharedState) -> Result<&ClassifierAdvisor, ApiError> {
    state.classifier.as_ref().ok_or(ApiError::ClassifierUnavailable)
}

/// POST /triage/classifier
pub async fn predict(
    State(state): State<SharedState>,
    body: Result<Json<ClassifierRequest>, JsonRejection>,
) -> Result<Json<ClassifierResponse>, ApiError> {
    let advisor = advisor(&state)?;
    let Json(req) = body?;
    validate_classifier_request(&req)?;

    let model = advisor.model();
    let normalized = normalize_symptoms(model, req.symptoms.as_slice());
    let input = ClassifierInput {
        age: req.age,
        sex: req.sex.unwrap_or_else(|| "unknown".to_string()),
        symptoms: normalized.recognized.clone(),
    };
    let k = req.k.unwrap_or(state.config.classifier.top_k);
    let predictions = model.predict_top_k(&input, k);

    Ok(Json(ClassifierResponse {
        predictions,
        recognized: normalized.recognized,
        unknown: normalized.unknown,
    }))
}

/// POST /triage/classifier/advice
pub async fn advice(
    State(state): State<SharedState>,
    body: Result<Json<TriageRequest>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let advisor = advisor(&state)?;
    let Json(req) = body?;
    validate_triage_request(&req)?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("classifier_advice", %request_id);
    Ok(Json(span.in_scope(|| advisor.advise(&req))))
}

/// GET /triage/classifier/vocab
pub async fn vocab(State(state): State<SharedState>) -> Result<Json<Vec<SymptomChip>>, ApiError> {
    Ok(Json(symptom_chips(advisor(&state)?.model())))
}
