use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::models::MatchResult;
use crate::matching::pipeline::{match_programs, MatchOutcome};
use crate::models::category::Category;
use crate::models::user::UserProfile;
use crate::profile::validation::{validate_message, validate_user_id};
use crate::profile::{build_profile, SessionHints};
use crate::session::UserSession;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub user_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session: Option<SessionHints>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<ProcessRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    SupportPrograms,
    NoResults,
    Error,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub categories: Vec<Category>,
    pub business_summary: String,
}

#[derive(Debug, Serialize)]
pub struct MatchData {
    pub programs: Vec<MatchResult>,
    pub fallback: bool,
    #[serde(rename = "userInfo")]
    pub user_info: UserInfo,
}

/// Envelope returned for every processed message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MatchData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub request_id: Uuid,
}

impl ProcessResponse {
    fn from_outcome(outcome: MatchOutcome, profile: UserProfile, request_id: Uuid) -> Self {
        let user_info = UserInfo {
            categories: profile.categories,
            business_summary: profile.business_summary,
        };
        match outcome {
            MatchOutcome::Matched { programs, fallback } => Self {
                success: true,
                kind: ResponseKind::SupportPrograms,
                message: Some(format!("{}개의 지원사업을 찾았습니다.", programs.len())),
                data: Some(MatchData {
                    programs,
                    fallback,
                    user_info,
                }),
                error: None,
                request_id,
            },
            MatchOutcome::NoResults => Self {
                success: true,
                kind: ResponseKind::NoResults,
                message: Some("현재 조건에 맞는 지원사업을 찾을 수 없습니다.".to_string()),
                data: Some(MatchData {
                    programs: Vec::new(),
                    fallback: false,
                    user_info,
                }),
                error: None,
                request_id,
            },
        }
    }

    /// Error envelope: `error` carries the stable code, `message` the text
    /// safe to show the user.
    fn failed(err: &AppError, request_id: Uuid) -> Self {
        let (_, code) = err.status_and_code();
        Self {
            success: false,
            kind: ResponseKind::Error,
            data: None,
            message: Some(err.public_message()),
            error: Some(code.to_string()),
            request_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub results: Vec<ProcessResponse>,
}

/// Validate, build the profile, remember it, and run the matcher.
async fn process_request(
    state: &AppState,
    req: &ProcessRequest,
    request_id: Uuid,
) -> Result<ProcessResponse, AppError> {
    validate_user_id(&req.user_id)?;
    validate_message(&req.message)?;
    let user_id = req.user_id.trim();

    let stored = state
        .sessions
        .get(user_id)
        .await
        .inspect_err(|e| warn!("Session lookup for {user_id} failed: {e}"))
        .ok()
        .flatten();
    let profile = build_profile(user_id, &req.message, req.session.as_ref(), stored.as_ref());

    if !profile.categories.is_empty() {
        if let Err(e) = state
            .sessions
            .put(user_id, &UserSession::from_profile(&profile))
            .await
        {
            warn!("Session write for {user_id} failed: {e}");
        }
    }

    info!(
        %request_id,
        "Processing message for {} (categories: [{}])",
        user_id,
        profile.category_list()
    );

    let source = state.snapshots.current().await;
    let outcome = match_programs(state.scorer.as_ref(), &source, &profile).await?;
    Ok(ProcessResponse::from_outcome(outcome, profile, request_id))
}

/// POST /api/process
///
/// Always answers with the envelope. Failures, including an unreadable body,
/// become `type: "error"` with the status their `AppError` maps to.
pub async fn handle_process(
    State(state): State<AppState>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> (StatusCode, Json<ProcessResponse>) {
    let request_id = Uuid::new_v4();
    let result = match body {
        Ok(Json(req)) => process_request(&state, &req, request_id).await,
        Err(rejection) => Err(AppError::Validation(format!(
            "요청 형식이 올바르지 않습니다: {}",
            rejection.body_text()
        ))),
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            let (status, _) = e.status_and_code();
            if status.is_server_error() {
                error!(%request_id, "Processing failed: {e}");
            } else {
                warn!(%request_id, "Rejected request: {e}");
            }
            (status, Json(ProcessResponse::failed(&e, request_id)))
        }
    }
}

/// POST /api/batch
///
/// Items run in order. A failing item becomes an error envelope in its slot;
/// the batch as a whole still succeeds.
pub async fn handle_batch(
    State(state): State<AppState>,
    Json(batch): Json<BatchRequest>,
) -> Json<BatchResponse> {
    let mut results = Vec::with_capacity(batch.requests.len());
    for req in &batch.requests {
        let request_id = Uuid::new_v4();
        let result = match process_request(&state, req, request_id).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%request_id, "Batch item for {:?} failed: {}", req.user_id, e);
                ProcessResponse::failed(&e, request_id)
            }
        };
        results.push(result);
    }
    info!("Processed batch of {}", results.len());

    Json(BatchResponse {
        success: true,
        results,
    })
}

/// GET /api/categories
pub async fn handle_categories() -> Json<Value> {
    let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
    let codes: Map<String, Value> = Category::ALL
        .iter()
        .map(|c| (c.name().to_string(), Value::from(c.code())))
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "categories": names,
            "codes": codes
        }
    }))
}
