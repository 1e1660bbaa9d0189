//! Rule-based triage endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use carepath_common::{TriageRequest, TriageResponse};
use carepath_triage::Symptom;

use crate::error::ApiError;
use crate::state::SharedState;
use crate::validation::validate_triage_request;

/// POST /triage/recommendations
pub async fn recommendations(
    State(state): State<SharedState>,
    body: Result<Json<TriageRequest>, JsonRejection>,
) -> Result<Json<TriageResponse>, ApiError> {
    let Json(req) = body?;
    validate_triage_request(&req)?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("triage", %request_id, symptoms = req.symptoms.len());
    let resp = span.in_scope(|| state.engine.triage(&req));
    Ok(Json(resp))
}

/// GET /triage/vocab
pub async fn vocab(State(state): State<SharedState>) -> Json<Vec<Symptom>> {
    Json(state.engine.knowledge_base().list_symptoms().to_vec())
}
