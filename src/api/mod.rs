use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Settings;
use crate::error::ScenarioError;
use crate::models::{ApiResponse, Game, OddsEvent, ScenarioRequest, ScenarioResponse};
use crate::services::{
    list_games, NflTeamMatcher, NflverseSchedule, OddsProvider, OpenAiClient, ScenarioEngine,
    ScenarioModel, ScheduleProvider, TheOddsApi,
};

/// Shared per-process handles. Cloning is cheap (Arc refcounts).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScenarioEngine>,
    pub odds: Arc<dyn OddsProvider>,
    pub schedule: Arc<dyn ScheduleProvider>,
}

impl AppState {
    /// Wire the production providers around one pooled HTTP client.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let odds: Arc<dyn OddsProvider> = Arc::new(TheOddsApi::new(client.clone(), settings));
        let schedule: Arc<dyn ScheduleProvider> =
            Arc::new(NflverseSchedule::new(client.clone(), settings));
        let model = OpenAiClient::from_settings(client, settings)
            .map(|m| Arc::new(m) as Arc<dyn ScenarioModel>);

        if model.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, every scenario request will fall back");
        }
        if !settings.has_odds_key() {
            tracing::warn!("THE_ODDS_API_KEY not set, scenarios will run without live odds");
        }

        let engine = Arc::new(ScenarioEngine::new(odds.clone(), model, Arc::new(NflTeamMatcher)));
        Ok(Self { engine, odds, schedule })
    }
}

pub async fn serve(settings: Settings, port: u16) -> anyhow::Result<()> {
    let state = AppState::from_settings(&settings)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(
        "Trueline API server listening on port {} ({}, base url {})",
        port,
        settings.app_env,
        settings.api_base_url()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/games", get(get_games_handler))
        .route("/odds", get(get_odds_handler))
        .route("/generate-scenarios", post(generate_scenarios_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Trueline API is running" }))
}

// Health check endpoint
#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    generation_configured: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus {
        status: "Trueline API is running",
        generation_configured: state.engine.has_model(),
    }))
}

// GET /games - Upcoming games (placeholder list when the schedule source is down)
async fn get_games_handler(State(state): State<AppState>) -> Json<Vec<Game>> {
    Json(list_games(state.schedule.as_ref()).await)
}

// GET /odds?game_id= - Raw odds board passthrough
#[derive(Deserialize)]
struct OddsQuery {
    game_id: Option<String>,
}

#[derive(Serialize)]
struct OddsPassthrough {
    game_id: Option<String>,
    odds: Vec<OddsEvent>,
}

async fn get_odds_handler(
    State(state): State<AppState>,
    Query(params): Query<OddsQuery>,
) -> Result<Json<OddsPassthrough>, (StatusCode, Json<ApiResponse<()>>)> {
    match state.odds.fetch_odds().await {
        Ok(odds) => Ok(Json(OddsPassthrough {
            game_id: params.game_id,
            odds,
        })),
        Err(e) => {
            tracing::error!("Failed to fetch odds: {}", e);
            let status = match e {
                ScenarioError::ConfigurationMissing(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((status, Json(ApiResponse::error(e.to_string()))))
        }
    }
}

// POST /generate-scenarios - Always 200; failures come back as the fallback scenario
async fn generate_scenarios_handler(
    State(state): State<AppState>,
    Json(request): Json<ScenarioRequest>,
) -> Json<ScenarioResponse> {
    Json(state.engine.generate_scenarios(&request).await)
}
