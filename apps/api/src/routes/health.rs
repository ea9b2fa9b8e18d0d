use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the active tip phrasing backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "ats-scanner",
        "tip_backend": state.tip_phraser.backend(),
        "vocabulary_terms": state.engine.vocabulary().len(),
        "uptime_seconds": (Utc::now() - state.started_at).num_seconds(),
    }))
}
