pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Scoring runs
        .route("/api/v1/influence/compute", post(handlers::compute))
        .route("/api/v1/influence/runs/latest", get(handlers::latest_run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use influence_core::{ArticleRef, Asset, Mention, Person, ScoringParams};
    use tower::ServiceExt;

    use crate::engine::InfluenceEngine;
    use crate::store::MemoryStore;

    fn mention(entity: &str, article: &str) -> Mention {
        let published = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Mention {
            entity_id: entity.to_string(),
            article_id: article.to_string(),
            mention_count: 1,
            created_at: published,
            article: Some(ArticleRef {
                id: article.to_string(),
                sentiment_score: Some(0.4),
                published_at: Some(published),
                crawled_at: None,
            }),
        }
    }

    fn app(store: MemoryStore) -> (Router, Arc<InfluenceEngine>) {
        let engine =
            Arc::new(InfluenceEngine::new(Arc::new(store), ScoringParams::default()).unwrap());
        let state = AppState {
            engine: engine.clone(),
        };
        (create_router().with_state(state), engine)
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::new()
            .with_people(vec![Person {
                id: "musk".to_string(),
                name: "Elon Musk".to_string(),
                influence_score: 0,
            }])
            .with_assets(vec![Asset {
                id: "tsla".to_string(),
                symbol: "TSLA".to_string(),
                name: "Tesla".to_string(),
                influence_score: 0,
            }])
            .with_person_mentions(vec![mention("musk", "a1")])
            .with_asset_mentions(vec![mention("tsla", "a1")])
    }

    async fn json_of(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(MemoryStore::new());
        let (status, body) = json_of(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
        assert!(body["last_run_at"].is_null());
    }

    #[tokio::test]
    async fn test_latest_run_before_any_run() {
        let (app, _) = app(MemoryStore::new());
        let (status, body) = json_of(app, get("/api/v1/influence/runs/latest")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_compute_then_latest() {
        let (app, _) = app(seeded_store());

        let (status, body) = json_of(
            app.clone(),
            post("/api/v1/influence/compute?as_of=2024-06-02T00:00:00Z"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["people_updated"], 1);
        assert_eq!(body["assets_updated"], 1);
        assert_eq!(body["relationships_written"], 1);
        assert_eq!(body["as_of"], "2024-06-02T00:00:00Z");
        let run_id = body["run_id"].clone();

        let (status, body) = json_of(app, get("/api/v1/influence/runs/latest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["run_id"], run_id);
    }

    #[tokio::test]
    async fn test_compute_fetch_failure() {
        let (app, _) = app(seeded_store().failing_fetch("people"));
        let (status, body) = json_of(app, post("/api/v1/influence/compute")).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "DATA_FETCH_ERROR");
    }

    #[tokio::test]
    async fn test_compute_conflict_while_running() {
        let (app, engine) = app(seeded_store());
        let _held = engine.hold_run_lock().unwrap();

        let (status, body) = json_of(app, post("/api/v1/influence/compute")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "RUN_IN_PROGRESS");
    }
}
