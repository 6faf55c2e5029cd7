//! Live odds from The Odds API.
//!
//! ## Credit budget
//! Each `fetch_odds` call costs markets × regions credits: **3** with the
//! default `us` region (h2h, spreads, totals). Nothing is cached; every
//! scenario request pulls a fresh board.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;
use crate::error::ScenarioError;
use crate::models::OddsEvent;

const ODDS_API_BASE: &str = "https://api.the-odds-api.com/v4/sports";

/// Source of the raw odds board. Implementations must be safe to share
/// between in-flight requests.
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Returns every listed game with its bookmakers, in provider order.
    ///
    /// A missing API key is reported as `ConfigurationMissing`, never as an
    /// empty board.
    async fn fetch_odds(&self) -> Result<Vec<OddsEvent>, ScenarioError>;
}

pub struct TheOddsApi {
    client: Client,
    api_key: Option<String>,
    sport_key: String,
    regions: String,
    timeout: Duration,
}

impl TheOddsApi {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            api_key: settings.odds_api_key.clone(),
            sport_key: settings.odds_sport.clone(),
            regions: settings.odds_regions.clone(),
            timeout: Duration::from_secs(settings.http_timeout_secs),
        }
    }

    fn url(&self, api_key: &str) -> String {
        format!(
            "{}/{}/odds/\
             ?apiKey={}&regions={}&markets=h2h,spreads,totals&oddsFormat=american&dateFormat=iso",
            ODDS_API_BASE, self.sport_key, api_key, self.regions
        )
    }
}

#[async_trait]
impl OddsProvider for TheOddsApi {
    async fn fetch_odds(&self) -> Result<Vec<OddsEvent>, ScenarioError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ScenarioError::ConfigurationMissing("THE_ODDS_API_KEY"))?;

        tracing::debug!("Odds: fetching {} ({})", self.sport_key, self.regions);

        let resp = self
            .client
            .get(self.url(api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ScenarioError::OddsTransport(e.to_string()))?;

        let status = resp.status();
        if status == 401 {
            return Err(ScenarioError::OddsTransport(
                "Odds API: invalid API key (401)".to_string(),
            ));
        }
        if status == 422 {
            return Err(ScenarioError::OddsTransport(format!(
                "Odds API: sport {} not in subscription (422)",
                self.sport_key
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScenarioError::OddsTransport(format!(
                "Odds API HTTP {}: {}",
                status, body
            )));
        }

        if let Some(remaining) = resp
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            tracing::debug!("Odds: {} requests remaining this month", remaining);
        }

        let events: Vec<OddsEvent> = resp
            .json()
            .await
            .map_err(|e| ScenarioError::OddsTransport(format!("Odds API payload: {}", e)))?;

        tracing::info!("Odds: {} {} events on the board", events.len(), self.sport_key);
        Ok(events)
    }
}
