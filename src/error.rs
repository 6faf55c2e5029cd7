use thiserror::Error;

/// Failures inside the scenario pipeline.
///
/// Every variant ends up in the same place (the single-scenario fallback), but
/// the tag is kept so logs can tell a quota problem from a bad JSON payload.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0} not set")]
    ConfigurationMissing(&'static str),

    #[error("odds provider error: {0}")]
    OddsTransport(String),

    #[error("no market found for game {0}")]
    NoMatchingMarket(String),

    #[error("prompt composition failed: {0}")]
    Composition(String),

    #[error("generation request failed: {0}")]
    GenerationTransport(String),

    #[error("generation returned unusable output: {0}")]
    GenerationParse(String),
}

impl ScenarioError {
    /// Short stable tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigurationMissing(_) => "configuration_missing",
            Self::OddsTransport(_) => "odds_transport",
            Self::NoMatchingMarket(_) => "no_matching_market",
            Self::Composition(_) => "composition",
            Self::GenerationTransport(_) => "generation_transport",
            Self::GenerationParse(_) => "generation_parse",
        }
    }
}

impl From<reqwest::Error> for ScenarioError {
    fn from(e: reqwest::Error) -> Self {
        Self::GenerationTransport(e.to_string())
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        Self::GenerationParse(e.to_string())
    }
}
