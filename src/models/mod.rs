use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_LINES_SOURCE: &str = "DraftKings";

fn default_lines_source() -> String {
    DEFAULT_LINES_SOURCE.to_string()
}

// `null` and "" mean "use the default book".
fn lines_source_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default_lines_source))
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

// RFC 3339, or an ISO timestamp without offset read as UTC.
fn utc_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRequest {
    pub game_id: String, // "2025_01_KC_PHI"
    pub risk_profile: String, // "Conservative", "Balanced", "Aggressive" (free text)
    #[serde(default = "default_lines_source", deserialize_with = "lines_source_or_default")]
    pub lines_source: String,
    #[serde(deserialize_with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ScenarioRequest {
    pub fn new(game_id: impl Into<String>, risk_profile: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            risk_profile: risk_profile.into(),
            lines_source: default_lines_source(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestBet {
    pub wager: String,
    pub odds: String, // American odds, e.g. "-110"
    pub implied_prob: f64,
    pub model_edge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub probability: f64,
    pub summary: String,
    pub best_bet: BestBet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter_spread_parlay: Option<Vec<String>>, // One entry per quarter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResponse {
    pub scenarios: Vec<Scenario>,
    pub lines_timestamp: DateTime<Utc>,
    pub book_used: String,
}

// ── Odds API payload ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub commence_time: Option<DateTime<Utc>>,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmaker {
    #[serde(default)]
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub key: String, // "h2h", "spreads", "totals"
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

// ── Schedule ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_lines_source() {
        let req: ScenarioRequest = serde_json::from_str(
            r#"{"game_id":"2025_01_KC_PHI","risk_profile":"Balanced","timestamp":"2025-09-04T20:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.lines_source, "DraftKings");
    }

    #[test]
    fn test_request_null_or_blank_lines_source() {
        for raw in ["null", r#""""#] {
            let req: ScenarioRequest = serde_json::from_str(&format!(
                r#"{{"game_id":"2025_01_KC_PHI","risk_profile":"Balanced","lines_source":{},"timestamp":"2025-09-04T20:00:00Z"}}"#,
                raw
            ))
            .unwrap();
            assert_eq!(req.lines_source, "DraftKings");
        }
    }

    #[test]
    fn test_request_accepts_naive_timestamp() {
        let req: ScenarioRequest = serde_json::from_str(
            r#"{"game_id":"2025_01_KC_PHI","risk_profile":"Balanced","timestamp":"2025-09-04T20:00:00"}"#,
        )
        .unwrap();
        assert_eq!(req.timestamp.to_rfc3339(), "2025-09-04T20:00:00+00:00");

        let req: ScenarioRequest = serde_json::from_str(
            r#"{"game_id":"2025_01_KC_PHI","risk_profile":"Balanced","timestamp":"2025-09-04T16:00:00-04:00"}"#,
        )
        .unwrap();
        assert_eq!(req.timestamp.to_rfc3339(), "2025-09-04T20:00:00+00:00");
    }

    #[test]
    fn test_request_rejects_garbage_timestamp() {
        let parsed: Result<ScenarioRequest, _> = serde_json::from_str(
            r#"{"game_id":"2025_01_KC_PHI","risk_profile":"Balanced","timestamp":"kickoff"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_optional_scenario_fields_are_omitted() {
        let scenario = Scenario {
            probability: 0.4,
            summary: "Shootout".to_string(),
            best_bet: BestBet {
                wager: "Over 47.5".to_string(),
                odds: "-110".to_string(),
                implied_prob: 0.5238,
                model_edge: 0.05,
            },
            quarter_spread_parlay: None,
            explanation: None,
            reasoning: None,
        };
        let json = serde_json::to_value(&scenario).unwrap();
        assert!(json.get("quarter_spread_parlay").is_none());
        assert!(json.get("reasoning").is_none());
    }

    #[test]
    fn test_odds_event_tolerates_missing_bookmakers() {
        let event: OddsEvent =
            serde_json::from_str(r#"{"home_team":"Philadelphia Eagles","away_team":"Kansas City Chiefs"}"#)
                .unwrap();
        assert!(event.bookmakers.is_empty());
    }
}
