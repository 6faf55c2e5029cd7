use crate::error::ScenarioError;
use crate::models::{Market, ScenarioRequest};
use crate::services::snapshot::MarketSnapshot;
use crate::utils::format_american;

pub const NO_LIVE_ODDS: &str = "NO LIVE ODDS AVAILABLE";

/// The two text blocks sent to the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPrompt {
    pub research_context: String,
    pub instruction: String,
}

const OUTPUT_SCHEMA: &str = r#"{
  "scenarios": [
    {
      "probability": 0.0,
      "summary": "string",
      "best_bet": {
        "wager": "string",
        "odds": "American odds string, e.g. -110 or +150",
        "implied_prob": 0.0,
        "model_edge": 0.0
      },
      "quarter_spread_parlay": ["Q1: ...", "Q2: ...", "Q3: ...", "Q4: ..."],
      "explanation": "string (use when no quarter parlay is given)",
      "reasoning": "string"
    }
  ]
}"#;

/// Build the research context and generation instruction for one request.
pub fn compose(
    request: &ScenarioRequest,
    snapshot: Option<&MarketSnapshot>,
) -> Result<ScenarioPrompt, ScenarioError> {
    let (book_used, odds_block) = match snapshot {
        Some(snap) => (snap.book_used.as_str(), render_markets(&snap.markets)?),
        None => (request.lines_source.as_str(), NO_LIVE_ODDS.to_string()),
    };

    let research_context = format!(
        r#"You are an NFL betting analyst producing scenario-based recommendations.
Research inputs considered for game {game_id}:
- Efficiency metrics: EPA/play, success rate, DVOA, red zone and third down efficiency
- Injury status: key starters questionable or out, snap-count trends
- Market movement: opening vs current lines, public vs sharp money splits
- Weather: wind, precipitation and temperature at kickoff

Live odds ({book_used}):
{odds_block}"#,
        game_id = request.game_id,
        book_used = book_used,
        odds_block = odds_block,
    );

    let instruction = format!(
        r#"Generate exactly 3 distinct game scenarios for {game_id} for a {risk} bettor.
Each scenario describes a different way the game could unfold.
- Use the live odds above for every best_bet when they are available; otherwise quote realistic market odds.
- "probability" is your own estimate (0.0 to 1.0) that the scenario happens.
- "implied_prob" is the probability implied by best_bet.odds.
- "model_edge" is your estimated edge over the market odds (your probability minus implied_prob).
- "quarter_spread_parlay", when given, has exactly 4 entries, one per quarter.
- "reasoning" explains how the research inputs support the scenario.
Respond with a single JSON object matching this schema and nothing else:
{schema}"#,
        game_id = request.game_id,
        risk = request.risk_profile,
        schema = OUTPUT_SCHEMA,
    );

    Ok(ScenarioPrompt {
        research_context,
        instruction,
    })
}

/// Markets as pretty JSON with prices shown as American odds strings.
fn render_markets(markets: &[Market]) -> Result<String, ScenarioError> {
    let rendered: Vec<serde_json::Value> = markets
        .iter()
        .map(|m| {
            let outcomes: Vec<serde_json::Value> = m
                .outcomes
                .iter()
                .map(|o| {
                    serde_json::json!({
                        "name": o.name,
                        "odds": format_american(o.price),
                        "point": o.point,
                    })
                })
                .collect();
            serde_json::json!({ "key": m.key, "outcomes": outcomes })
        })
        .collect();

    serde_json::to_string_pretty(&rendered).map_err(|e| ScenarioError::Composition(e.to_string()))
}
