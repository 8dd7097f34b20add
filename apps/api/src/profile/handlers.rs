use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::profile::validation::validate_user_id;
use crate::session::UserSession;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub data: UserSession,
}

/// GET /api/session/:user_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    validate_user_id(&user_id)?;
    let session = state
        .sessions
        .get(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{user_id}의 세션이 없습니다.")))?;
    Ok(Json(SessionResponse {
        success: true,
        data: session,
    }))
}

/// DELETE /api/session/:user_id
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    validate_user_id(&user_id)?;
    state.sessions.clear(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
