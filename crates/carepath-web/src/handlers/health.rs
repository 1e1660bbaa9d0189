use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET /healthz
pub async fn healthz(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({ "ok": true, "classifier": state.classifier.is_some() }))
}
