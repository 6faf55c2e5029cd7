//! Router-level tests: requests go through axum with fake providers behind it.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use trueline_backend::api::{create_router, AppState};
use trueline_backend::error::ScenarioError;
use trueline_backend::models::{Game, OddsEvent};
use trueline_backend::services::{
    OddsProvider, ScenarioEngine, ScheduleProvider, SubstringMatcher,
};

struct EmptyBoard;

#[async_trait]
impl OddsProvider for EmptyBoard {
    async fn fetch_odds(&self) -> Result<Vec<OddsEvent>, ScenarioError> {
        Ok(vec![])
    }
}

struct NoOddsKey;

#[async_trait]
impl OddsProvider for NoOddsKey {
    async fn fetch_odds(&self) -> Result<Vec<OddsEvent>, ScenarioError> {
        Err(ScenarioError::ConfigurationMissing("THE_ODDS_API_KEY"))
    }
}

struct OneGame;

#[async_trait]
impl ScheduleProvider for OneGame {
    async fn upcoming_games(&self) -> anyhow::Result<Vec<Game>> {
        Ok(vec![Game {
            id: "2025_02_PHI_KC".to_string(),
            name: "NFL: PHI @ KC (Week 2)".to_string(),
            start_time: Utc::now(),
        }])
    }
}

struct ScheduleDown;

#[async_trait]
impl ScheduleProvider for ScheduleDown {
    async fn upcoming_games(&self) -> anyhow::Result<Vec<Game>> {
        Err(anyhow::anyhow!("nflverse unreachable"))
    }
}

/// App with no generation model configured.
fn app(odds: Arc<dyn OddsProvider>, schedule: Arc<dyn ScheduleProvider>) -> Router {
    let engine = Arc::new(ScenarioEngine::new(odds.clone(), None, Arc::new(SubstringMatcher)));
    create_router(AppState { engine, odds, schedule })
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("failed to build json request"),
        None => builder.body(Body::empty()).expect("failed to build empty request"),
    };

    let response = app.oneshot(request).await.expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_reports_running() {
    let (status, body) = send(app(Arc::new(EmptyBoard), Arc::new(OneGame)), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Trueline API is running");
}

#[tokio::test]
async fn health_reports_generation_not_configured() {
    let (status, body) =
        send(app(Arc::new(EmptyBoard), Arc::new(OneGame)), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["generation_configured"], false);
}

#[tokio::test]
async fn games_passthrough_and_placeholder() {
    let (status, body) =
        send(app(Arc::new(EmptyBoard), Arc::new(OneGame)), Method::GET, "/games", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "2025_02_PHI_KC");

    let (status, body) =
        send(app(Arc::new(EmptyBoard), Arc::new(ScheduleDown)), Method::GET, "/games", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["id"], "2025_01_KC_PHI");
}

#[tokio::test]
async fn odds_without_key_is_service_unavailable() {
    let (status, body) = send(
        app(Arc::new(NoOddsKey), Arc::new(OneGame)),
        Method::GET,
        "/odds?game_id=2025_01_KC_PHI",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "THE_ODDS_API_KEY not set");
}

#[tokio::test]
async fn odds_passthrough_echoes_game_id() {
    let (status, body) = send(
        app(Arc::new(EmptyBoard), Arc::new(OneGame)),
        Method::GET,
        "/odds?game_id=test",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["game_id"], "test");
    assert_eq!(body["odds"], json!([]));
}

#[tokio::test]
async fn generate_scenarios_falls_back_with_ok_status() {
    let payload = json!({
        "game_id": "2025_01_KC_PHI",
        "risk_profile": "Balanced",
        "lines_source": "DraftKings",
        "timestamp": "2025-09-04T20:00:00Z"
    });

    let (status, body) = send(
        app(Arc::new(EmptyBoard), Arc::new(OneGame)),
        Method::POST,
        "/generate-scenarios",
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book_used"], "DraftKings");
    let scenarios = body["scenarios"].as_array().expect("scenarios array");
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0]["probability"], 0.5);
    assert_eq!(scenarios[0]["best_bet"]["odds"], "N/A");
    assert_eq!(scenarios[0]["reasoning"], "OPENAI_API_KEY not set");
    assert!(body["lines_timestamp"].is_string());
}

#[tokio::test]
async fn generate_scenarios_defaults_lines_source() {
    let payload = json!({
        "game_id": "2025_01_KC_PHI",
        "risk_profile": "Aggressive",
        "timestamp": "2025-09-04T20:00:00Z"
    });

    let (_, body) = send(
        app(Arc::new(EmptyBoard), Arc::new(OneGame)),
        Method::POST,
        "/generate-scenarios",
        Some(payload),
    )
    .await;

    assert_eq!(body["book_used"], "DraftKings");
}

#[tokio::test]
async fn generate_scenarios_accepts_null_lines_source() {
    let payload = json!({
        "game_id": "2025_01_KC_PHI",
        "risk_profile": "Balanced",
        "lines_source": null,
        "timestamp": "2025-09-04T20:00:00Z"
    });

    let (status, body) = send(
        app(Arc::new(EmptyBoard), Arc::new(OneGame)),
        Method::POST,
        "/generate-scenarios",
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book_used"], "DraftKings");
    assert_eq!(body["scenarios"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn generate_scenarios_accepts_timestamp_without_offset() {
    let payload = json!({
        "game_id": "2025_01_KC_PHI",
        "risk_profile": "Conservative",
        "lines_source": "FanDuel",
        "timestamp": "2025-09-04T20:00:00"
    });

    let (status, body) = send(
        app(Arc::new(EmptyBoard), Arc::new(OneGame)),
        Method::POST,
        "/generate-scenarios",
        Some(payload),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book_used"], "FanDuel");
    assert_eq!(body["scenarios"][0]["summary"], "Scenario generation failed");
}
