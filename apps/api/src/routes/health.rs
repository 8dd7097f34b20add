use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and the backends in use.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let programs = state.snapshots.current().await.program_count();
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "bizmatch-api",
        "services": {
            "scorer": state.scorer.backend(),
            "registry": state.registry.base_url(),
            "sessionStore": state.sessions.backend_name(),
            "snapshotPrograms": programs
        }
    }))
}
