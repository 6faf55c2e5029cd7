use std::env;

/// App Runner domain used when `APP_ENV=production`.
const PROD_URL: &str = "https://zpz97xmkin.us-east-1.awsapprunner.com";
const DEFAULT_SCHEDULE_URL: &str =
    "https://github.com/nflverse/nfldata/raw/master/data/games.csv";

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_env: String,
    pub is_prod: bool,
    pub dev_url: String,
    pub port: u16,

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub odds_api_key: Option<String>,
    pub odds_sport: String,
    pub odds_regions: String,

    pub schedule_url: String,
    pub schedule_limit: usize,
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            is_prod: false,
            dev_url: "http://localhost:8000".to_string(),
            port: 8000,
            openai_api_key: None,
            openai_model: "gpt-4o".to_string(),
            odds_api_key: None,
            odds_sport: "americanfootball_nfl".to_string(),
            odds_regions: "us".to_string(),
            schedule_url: DEFAULT_SCHEDULE_URL.to_string(),
            schedule_limit: 32,
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load from the environment (after `.env`, if present).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let app_env = get("APP_ENV").unwrap_or(defaults.app_env);
        let is_prod = app_env == "production";

        Self {
            is_prod,
            app_env,
            dev_url: get("API_BASE_URL").unwrap_or(defaults.dev_url),
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            odds_api_key: get("THE_ODDS_API_KEY"),
            odds_sport: get("ODDS_SPORT").unwrap_or(defaults.odds_sport),
            odds_regions: get("ODDS_REGIONS")
                .map(|v| v.to_ascii_lowercase())
                .unwrap_or(defaults.odds_regions),
            schedule_url: get("SCHEDULE_URL").unwrap_or(defaults.schedule_url),
            schedule_limit: get("SCHEDULE_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.schedule_limit),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs)
                .clamp(1, 300),
        }
    }

    pub fn api_base_url(&self) -> &str {
        if self.is_prod {
            PROD_URL
        } else {
            &self.dev_url
        }
    }

    pub fn has_odds_key(&self) -> bool {
        self.odds_api_key.is_some()
    }
}
