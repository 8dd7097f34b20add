use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::category::Category;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub categories: Vec<Category>,
    pub programs: usize,
}

/// POST /api/refresh-data
///
/// Pulls the configured categories from the registry and replaces the snapshot.
/// Categories that fail are left out of the new snapshot.
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let requested = &state.config.refresh_categories;
    info!(
        "Refreshing snapshot for {} categories from {}",
        requested.len(),
        state.registry.base_url()
    );

    let document = state.registry.fetch_all(requested).await?;
    let categories: Vec<Category> = document
        .categories()
        .filter_map(|(name, _)| Category::from_name(name))
        .collect();
    let programs = document.program_count();

    state.snapshots.replace(document).await?;

    Ok(Json(RefreshResponse {
        success: true,
        message: "지원사업 데이터가 새로고침되었습니다.".to_string(),
        categories,
        programs,
    }))
}
