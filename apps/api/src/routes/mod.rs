pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::matching::handlers::{handle_batch, handle_categories, handle_process};
use crate::profile::handlers::{handle_clear_session, handle_get_session};
use crate::rate_limit::limit_requests;
use crate::registry::handlers::handle_refresh;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/process", post(handle_process))
        .route("/batch", post(handle_batch))
        .route("/categories", get(handle_categories))
        .route("/refresh-data", post(handle_refresh))
        .route(
            "/session/:user_id",
            get(handle_get_session).delete(handle_clear_session),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit_requests,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::matching::scorer::fake::FakeScorer;
    use crate::matching::scorer::MatchScorer;
    use crate::rate_limit::RateLimiter;
    use crate::registry::snapshot::SnapshotStore;
    use crate::registry::BizInfoClient;
    use crate::session::SessionStore;

    const SCORED: &str = "**AI 바우처**\n- 점수 09점\n- 분석 AI 도입 사업과 부합\n\
                          **R&D 과제**\n- 점수 04점\n- 분석 관련성 낮음\n";

    async fn test_state(response: &str, rps: Option<u32>) -> (AppState, TempDir) {
        test_state_with(Arc::new(FakeScorer::responding(response)), rps).await
    }

    async fn test_state_with(
        scorer: Arc<dyn MatchScorer>,
        rps: Option<u32>,
    ) -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all_categories.json");
        let document = json!({
            "기술": {"jsonArray": [
                {"pblancNm": "AI 바우처", "bsnsSumryCn": "AI 솔루션 도입 지원", "rceptEngnHmpgUrl": "https://ai", "reqstBeginEndDe": "20250101 ~ 20250228"},
                {"pblancNm": "R&D 과제", "bsnsSumryCn": "기술개발 자금", "rceptEngnHmpgUrl": "https://rnd"}
            ]},
            "경영": {"jsonArray": [
                {"pblancNm": "컨설팅 지원", "bsnsSumryCn": "경영 컨설팅", "rceptEngnHmpgUrl": "https://cs"}
            ]}
        });
        std::fs::write(&path, document.to_string()).unwrap();

        let config = Config::for_tests(&path.to_string_lossy());
        let state = AppState {
            registry: BizInfoClient::new(&config).unwrap(),
            snapshots: SnapshotStore::load(&path).unwrap(),
            sessions: SessionStore::in_memory(),
            scorer,
            rate_limiter: rps.and_then(RateLimiter::new),
            config,
        };
        (state, dir)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_backends() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state).oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["scorer"], "fake");
        assert_eq!(body["services"]["sessionStore"], "memory");
        assert_eq!(body["services"]["snapshotPrograms"], 3);
    }

    #[tokio::test]
    async fn test_process_returns_scored_programs() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(post_json(
                "/api/process",
                json!({"userId": "u1", "message": "AI 기반 업무 자동화 솔루션을 개발합니다"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["type"], "support_programs");
        assert_eq!(body["data"]["fallback"], false);
        let programs = body["data"]["programs"].as_array().unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0]["name"], "AI 바우처");
        assert_eq!(programs[0]["score"], 9);
        assert_eq!(programs[0]["rceptEngnHmpgUrl"], "https://ai");
        assert_eq!(body["data"]["userInfo"]["categories"], json!(["기술"]));
        assert!(body["requestId"].is_string());
    }

    #[tokio::test]
    async fn test_process_remembers_profile_in_session() {
        let (state, _dir) = test_state(SCORED, None).await;
        let app = build_router(state);

        app.clone()
            .oneshot(post_json(
                "/api/process",
                json!({"userId": "u1", "message": "", "session": {"category": ["경영"], "businessSummary": "회계 컨설팅"}}),
            ))
            .await
            .unwrap();

        let response = app.oneshot(get("/api/session/u1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["categories"], json!(["경영"]));
        assert_eq!(body["data"]["businessSummary"], "회계 컨설팅");
    }

    #[tokio::test]
    async fn test_process_rejects_unsafe_message() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(post_json(
                "/api/process",
                json!({"userId": "u1", "message": "<script>alert(1)</script>"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_process_scorer_failure_is_error_envelope() {
        let (state, _dir) = test_state_with(Arc::new(FakeScorer::failing()), None).await;
        let response = build_router(state)
            .oneshot(post_json(
                "/api/process",
                json!({"userId": "u1", "message": "AI 기술 개발 기업입니다"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"], "LLM_ERROR");
        assert!(body["requestId"].is_string());
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_process_unreadable_body_is_error_envelope() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(post_json("/api/process", json!({"message": "userId 없음"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["type"], "error");
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_process_without_categories_is_no_results() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(post_json("/api/process", json!({"userId": "u1"})))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["type"], "no_results");
        assert_eq!(body["data"]["programs"], json!([]));
    }

    #[tokio::test]
    async fn test_batch_isolates_item_failures() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(post_json(
                "/api/batch",
                json!({"requests": [
                    {"userId": "u1", "message": "AI 기술 개발 기업입니다"},
                    {"userId": "", "message": "AI"}
                ]}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["type"], "support_programs");
        assert_eq!(results[1]["success"], false);
        assert_eq!(results[1]["type"], "error");
        assert!(results[1]["error"].is_string());
    }

    #[tokio::test]
    async fn test_batch_empty_message_item_is_no_results() {
        let scorer = Arc::new(FakeScorer::responding(SCORED));
        let (state, _dir) = test_state_with(scorer.clone(), None).await;
        let response = build_router(state)
            .oneshot(post_json(
                "/api/batch",
                json!({"requests": [
                    {"userId": "u1", "message": "AI 기반 업무 자동화 솔루션을 개발합니다"},
                    {"userId": "u2", "message": ""}
                ]}),
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);

        assert_eq!(results[0]["success"], true);
        assert_eq!(results[0]["type"], "support_programs");
        assert_eq!(results[0]["data"]["programs"][0]["name"], "AI 바우처");

        assert_eq!(results[1]["success"], true);
        assert_eq!(results[1]["type"], "no_results");
        assert_eq!(results[1]["data"]["programs"], json!([]));
        assert_eq!(results[1]["data"]["userInfo"]["categories"], json!([]));

        // Only the first item reaches the model.
        assert_eq!(scorer.calls(), 1);
    }

    #[tokio::test]
    async fn test_categories_lists_codes() {
        let (state, _dir) = test_state(SCORED, None).await;
        let response = build_router(state)
            .oneshot(get("/api/categories"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["data"]["categories"].as_array().unwrap().len(), 8);
        assert_eq!(body["data"]["codes"]["기술"], "02");
        assert_eq!(body["data"]["codes"]["기타"], "09");
    }

    #[tokio::test]
    async fn test_clear_session_then_missing() {
        let (state, _dir) = test_state(SCORED, None).await;
        let app = build_router(state);
        app.clone()
            .oneshot(post_json(
                "/api/process",
                json!({"userId": "u9", "message": "수출 기업입니다 해외 진출 준비"}),
            ))
            .await
            .unwrap();

        let delete = Request::builder()
            .method("DELETE")
            .uri("/api/session/u9")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/api/session/u9")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_api_only() {
        let (state, _dir) = test_state(SCORED, Some(1)).await;
        let app = build_router(state);

        let first = app.clone().oneshot(get("/api/categories")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let second = app.clone().oneshot(get("/api/categories")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        let health = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }
}
