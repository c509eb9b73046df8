use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use food_world::AppState;
use food_world::config::{
    AppConfig, CatalogConfig, PersistenceConfig, ResilienceConfig, ServerConfig, TelemetryConfig,
};
use food_world::persistence::providers::memory::MemoryProvider;
use food_world::recipes::RecipeCatalog;
use food_world::server::build_router;

fn test_config(rate_limit_enabled: bool, burst_size: f32) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        catalog: CatalogConfig {
            path: "data/recipes.json".to_string(),
        },
        persistence: PersistenceConfig {
            provider: "memory".to_string(),
            database_url: String::new(),
        },
        resilience: ResilienceConfig {
            rate_limit_enabled,
            timeout_disabled: false,
            requests_per_second: 0.001,
            burst_size,
            request_timeout_secs: 5,
        },
        telemetry: TelemetryConfig { json: false },
    }
}

fn app_with(config: AppConfig) -> Router {
    let catalog = Arc::new(
        RecipeCatalog::load_from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/data/recipes.json"))
            .expect("demo catalog"),
    );
    let state = AppState::new(Arc::new(config), catalog, Arc::new(MemoryProvider::new()));
    build_router(state)
}

fn app() -> Router {
    app_with(test_config(false, 10.0))
}

fn turn(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/turn")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_catalog_size() {
    let resp = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({ "status": "ok", "recipes": 10 })
    );
}

#[tokio::test]
async fn test_turn_roundtrip_and_session_inspection() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(turn(&json!({
            "userId": "user-1",
            "intent": "AddIntent",
            "ingredient": "avocados"
        })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "speech": "Added avocados. Add more ingredients or search for recipes.",
            "continueSession": true
        })
    );

    let resp = app
        .clone()
        .oneshot(turn(&json!({ "userId": "user-1", "intent": "SearchIntent" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["card"]["title"], "Guacamole");
    assert!(
        body["card"]["content"]
            .as_str()
            .unwrap()
            .starts_with("INGREDIENTS\n3 avocados.")
    );

    let resp = app
        .oneshot(get("/api/users/user-1/session"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let session = body_json(resp).await;
    assert_eq!(session["state"], "search");
    assert_eq!(session["ingredientList"], json!(["avocados"]));
    assert_eq!(session["recipe"], json!(3));
    assert_eq!(session["confirmForRestart"], json!(false));
}

#[tokio::test]
async fn test_stop_ends_the_conversation() {
    let resp = app()
        .oneshot(turn(&json!({ "userId": "user-1", "intent": "AMAZON.StopIntent" })))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["speech"], "Thanks for using food world!");
    assert_eq!(body["continueSession"], false);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let resp = app()
        .oneshot(get("/api/users/nobody/session"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_requests_are_rejected() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(turn(&json!({ "userId": "user-1", "intent": "DanceIntent" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .oneshot(turn(&json!({ "userId": "  ", "intent": "Help" })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limiter_rejects_bursts() {
    let app = app_with(test_config(true, 2.0));

    for _ in 0..2 {
        let resp = app.clone().oneshot(get("/api/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}
