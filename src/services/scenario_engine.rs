use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ScenarioError;
use crate::models::{BestBet, Scenario, ScenarioRequest, ScenarioResponse};
use crate::services::generator::{parse_generated, GeneratedScenario, ScenarioModel};
use crate::services::odds_fetcher::OddsProvider;
use crate::services::prompt::compose;
use crate::services::snapshot::{MarketSnapshot, MarketSnapshotBuilder, TeamMatcher};
use crate::utils::{american_to_implied_probability, is_placeholder_odds};

pub const PLACEHOLDER: &str = "N/A";
pub const FALLBACK_SUMMARY: &str = "Scenario generation failed";
pub const FALLBACK_PROBABILITY: f64 = 0.5;

/// Odds → snapshot → prompt → generation → reconciliation.
///
/// There is no retry around the generation call. A failed or unusable
/// completion is answered with the single fallback scenario.
pub struct ScenarioEngine {
    odds: Arc<dyn OddsProvider>,
    model: Option<Arc<dyn ScenarioModel>>,
    matcher: Arc<dyn TeamMatcher>,
}

impl ScenarioEngine {
    pub fn new(
        odds: Arc<dyn OddsProvider>,
        model: Option<Arc<dyn ScenarioModel>>,
        matcher: Arc<dyn TeamMatcher>,
    ) -> Self {
        Self { odds, model, matcher }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Always returns a well-formed response; failures become the fallback.
    pub async fn generate_scenarios(&self, request: &ScenarioRequest) -> ScenarioResponse {
        let span = tracing::info_span!(
            "generate_scenarios",
            request_id = %Uuid::new_v4(),
            game_id = %request.game_id,
            risk = %request.risk_profile
        );

        async {
            match self.run(request).await {
                Ok(response) => {
                    tracing::info!(
                        "Generated {} scenarios (book: {})",
                        response.scenarios.len(),
                        response.book_used
                    );
                    response
                }
                Err(e) => {
                    tracing::warn!(kind = e.kind(), "Scenario generation fell back: {}", e);
                    fallback_response(request, &e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &ScenarioRequest) -> Result<ScenarioResponse, ScenarioError> {
        let model = self
            .model
            .as_ref()
            .ok_or(ScenarioError::ConfigurationMissing("OPENAI_API_KEY"))?;

        let snapshot = self.snapshot_for(&request.game_id).await;
        let prompt = compose(request, snapshot.as_ref())?;

        tracing::debug!("Requesting scenarios from {}", model.name());
        let text = model.complete(&prompt).await?;
        let generated = parse_generated(&text)?;

        let scenarios = generated.scenarios.into_iter().map(reconcile).collect();
        let book_used = snapshot
            .map(|s| s.book_used)
            .unwrap_or_else(|| request.lines_source.clone());

        Ok(ScenarioResponse {
            scenarios,
            lines_timestamp: Utc::now(),
            book_used,
        })
    }

    /// Live odds for the game, or `None` to proceed without them.
    async fn snapshot_for(&self, game_id: &str) -> Option<MarketSnapshot> {
        let events = match self.odds.fetch_odds().await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(kind = e.kind(), "Proceeding without live odds: {}", e);
                return None;
            }
        };

        let snapshot = MarketSnapshotBuilder::new(self.matcher.as_ref()).build(game_id, &events);
        if snapshot.is_none() {
            let e = ScenarioError::NoMatchingMarket(game_id.to_string());
            tracing::info!(kind = e.kind(), "Proceeding without live odds: {}", e);
        }
        snapshot
    }
}

/// Turn a generated scenario into the response shape, filling `implied_prob`
/// from the odds when the model left it out or at zero.
pub fn reconcile(generated: GeneratedScenario) -> Scenario {
    let bet = generated.best_bet;
    let odds = bet.odds.unwrap_or_else(|| PLACEHOLDER.to_string());

    let implied_prob = match bet.implied_prob {
        Some(p) if p != 0.0 => p,
        _ if !is_placeholder_odds(&odds) => {
            let p = american_to_implied_probability(&odds);
            tracing::debug!("Reconciled implied_prob for {} at {}: {:.4}", bet.wager, odds, p);
            p
        }
        _ => 0.0,
    };

    Scenario {
        probability: generated.probability,
        summary: generated.summary,
        best_bet: BestBet {
            wager: bet.wager,
            odds,
            implied_prob,
            model_edge: bet.model_edge,
        },
        quarter_spread_parlay: generated.quarter_spread_parlay,
        explanation: generated.explanation,
        reasoning: generated.reasoning,
    }
}

/// The single scenario returned when the pipeline cannot produce real ones.
pub fn fallback_response(request: &ScenarioRequest, error: &ScenarioError) -> ScenarioResponse {
    ScenarioResponse {
        scenarios: vec![Scenario {
            probability: FALLBACK_PROBABILITY,
            summary: FALLBACK_SUMMARY.to_string(),
            best_bet: BestBet {
                wager: PLACEHOLDER.to_string(),
                odds: PLACEHOLDER.to_string(),
                implied_prob: 0.0,
                model_edge: 0.0,
            },
            quarter_spread_parlay: None,
            explanation: None,
            reasoning: Some(error.to_string()),
        }],
        lines_timestamp: Utc::now(),
        book_used: request.lines_source.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::GeneratedBestBet;

    fn generated(odds: Option<&str>, implied: Option<f64>) -> GeneratedScenario {
        GeneratedScenario {
            probability: 0.35,
            summary: "Defensive struggle".to_string(),
            best_bet: GeneratedBestBet {
                wager: "Under 45.5".to_string(),
                odds: odds.map(str::to_string),
                implied_prob: implied,
                model_edge: 0.03,
            },
            quarter_spread_parlay: None,
            explanation: Some("No parlay for low-scoring projections.".to_string()),
            reasoning: None,
        }
    }

    #[test]
    fn test_reconcile_fills_missing_implied_prob() {
        let s = reconcile(generated(Some("-150"), None));
        assert!((s.best_bet.implied_prob - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_overwrites_zero() {
        let s = reconcile(generated(Some("+150"), Some(0.0)));
        assert!((s.best_bet.implied_prob - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_reconcile_keeps_model_value() {
        let s = reconcile(generated(Some("-110"), Some(0.48)));
        assert_eq!(s.best_bet.implied_prob, 0.48);
    }

    #[test]
    fn test_reconcile_without_odds() {
        let s = reconcile(generated(None, None));
        assert_eq!(s.best_bet.odds, PLACEHOLDER);
        assert_eq!(s.best_bet.implied_prob, 0.0);

        let s = reconcile(generated(Some("N/A"), Some(0.0)));
        assert_eq!(s.best_bet.implied_prob, 0.0);
    }

    #[test]
    fn test_fallback_echoes_lines_source() {
        let mut request = ScenarioRequest::new("2025_01_KC_PHI", "Balanced");
        request.lines_source = "The Odds API (DraftKings)".to_string();
        let resp = fallback_response(&request, &ScenarioError::GenerationTransport("quota".into()));

        assert_eq!(resp.scenarios.len(), 1);
        assert_eq!(resp.book_used, "The Odds API (DraftKings)");
        let s = &resp.scenarios[0];
        assert_eq!(s.probability, 0.5);
        assert_eq!(s.best_bet.odds, "N/A");
        assert_eq!(s.best_bet.wager, "N/A");
        assert_eq!(s.reasoning.as_deref(), Some("generation request failed: quota"));
    }
}
