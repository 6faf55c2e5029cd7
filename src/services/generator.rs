use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::error::ScenarioError;
use crate::services::prompt::ScenarioPrompt;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const SCENARIO_COUNT: usize = 3;
const QUARTERS: usize = 4;

/// Text-completion service that answers a scenario prompt with JSON.
///
/// One request, one response. Implementations do not retry: a failed call
/// goes straight to the engine's fallback.
#[async_trait]
pub trait ScenarioModel: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &ScenarioPrompt) -> Result<String, ScenarioError>;
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    temperature: f64,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            timeout,
        }
    }

    /// `None` when `OPENAI_API_KEY` is not configured.
    pub fn from_settings(client: Client, settings: &Settings) -> Option<Self> {
        let api_key = settings.openai_api_key.as_ref()?;
        Some(Self::new(
            client,
            api_key.clone(),
            settings.openai_model.clone(),
            Duration::from_secs(settings.http_timeout_secs),
        ))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl ScenarioModel for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &ScenarioPrompt) -> Result<String, ScenarioError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
            messages: vec![
                ChatMessage { role: "system", content: &prompt.research_context },
                ChatMessage { role: "user", content: &prompt.instruction },
            ],
        };

        let resp = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScenarioError::GenerationTransport(format!(
                "OpenAI HTTP {}: {}",
                status, body
            )));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| ScenarioError::GenerationParse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ScenarioError::GenerationParse("empty completion".to_string()))
    }
}

// ── Generated payload (before reconciliation) ─────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratedScenarios {
    pub scenarios: Vec<GeneratedScenario>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratedScenario {
    pub probability: f64,
    pub summary: String,
    pub best_bet: GeneratedBestBet,
    #[serde(default)]
    pub quarter_spread_parlay: Option<Vec<String>>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratedBestBet {
    pub wager: String,
    #[serde(default)]
    pub odds: Option<String>,
    #[serde(default)]
    pub implied_prob: Option<f64>,
    pub model_edge: f64,
}

/// Parse completion text against the scenario schema.
///
/// Unknown fields, a scenario count other than three, out-of-range
/// probabilities and malformed quarter parlays are all rejected.
pub fn parse_generated(text: &str) -> Result<GeneratedScenarios, ScenarioError> {
    let parsed: GeneratedScenarios = serde_json::from_str(text.trim())?;
    validate(&parsed)?;
    Ok(parsed)
}

fn validate(parsed: &GeneratedScenarios) -> Result<(), ScenarioError> {
    if parsed.scenarios.len() != SCENARIO_COUNT {
        return Err(ScenarioError::GenerationParse(format!(
            "expected {} scenarios, got {}",
            SCENARIO_COUNT,
            parsed.scenarios.len()
        )));
    }

    for (i, s) in parsed.scenarios.iter().enumerate() {
        if !(0.0..=1.0).contains(&s.probability) {
            return Err(ScenarioError::GenerationParse(format!(
                "scenario {}: probability {} outside [0,1]",
                i + 1,
                s.probability
            )));
        }
        if let Some(p) = s.best_bet.implied_prob {
            if !(0.0..=1.0).contains(&p) {
                return Err(ScenarioError::GenerationParse(format!(
                    "scenario {}: implied_prob {} outside [0,1]",
                    i + 1,
                    p
                )));
            }
        }
        if !s.best_bet.model_edge.is_finite() {
            return Err(ScenarioError::GenerationParse(format!(
                "scenario {}: model_edge is not finite",
                i + 1
            )));
        }
        if let Some(parlay) = &s.quarter_spread_parlay {
            if parlay.len() != QUARTERS {
                return Err(ScenarioError::GenerationParse(format!(
                    "scenario {}: quarter_spread_parlay has {} legs, expected {}",
                    i + 1,
                    parlay.len(),
                    QUARTERS
                )));
            }
        }
    }

    Ok(())
}
