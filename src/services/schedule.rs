use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::models::Game;

// ── nflverse games.csv ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScheduleRow {
    game_id: String, // already "season_week_away_home"
    season: i32,
    game_type: String,
    week: u32,
    gameday: String,
    gametime: Option<String>,
    away_team: String,
    home_team: String,
    away_score: Option<u32>,
}

/// Games a user can pick from.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    async fn upcoming_games(&self) -> Result<Vec<Game>>;
}

pub struct NflverseSchedule {
    client: Client,
    url: String,
    limit: usize,
    timeout: std::time::Duration,
}

impl NflverseSchedule {
    pub fn new(client: Client, settings: &Settings) -> Self {
        Self {
            client,
            url: settings.schedule_url.clone(),
            limit: settings.schedule_limit,
            timeout: std::time::Duration::from_secs(settings.http_timeout_secs),
        }
    }
}

#[async_trait]
impl ScheduleProvider for NflverseSchedule {
    async fn upcoming_games(&self) -> Result<Vec<Game>> {
        tracing::info!("Fetching NFL schedule from nflverse...");

        let response = self.client
            .get(&self.url)
            .timeout(self.timeout)
            .send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Schedule API error {}: {}", status, body));
        }

        let body = response.text().await?;
        let games = parse_schedule(&body, Utc::now(), self.limit)?;
        tracing::info!("Schedule: {} upcoming games", games.len());
        Ok(games)
    }
}

/// Unplayed games of the latest season, soonest first.
pub fn parse_schedule(csv_text: &str, now: DateTime<Utc>, limit: usize) -> Result<Vec<Game>> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize::<ScheduleRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!("Skipping schedule row: {}", e),
        }
    }

    let Some(season) = rows.iter().map(|r| r.season).max() else {
        return Ok(Vec::new());
    };

    // Keep games that kicked off recently so in-progress ones stay selectable
    let cutoff = now - Duration::hours(4);

    let mut games: Vec<Game> = rows
        .into_iter()
        .filter(|r| r.season == season && r.away_score.is_none())
        .filter_map(|r| {
            let start_time = kickoff(&r.gameday, r.gametime.as_deref())?;
            if start_time < cutoff {
                return None;
            }
            let name = describe(&r);
            Some(Game { id: r.game_id, name, start_time })
        })
        .collect();

    games.sort_by_key(|g| g.start_time);
    games.truncate(limit);
    Ok(games)
}

/// nflverse kickoff times are US Eastern. Daylight saving is ignored.
fn kickoff(gameday: &str, gametime: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(gameday.trim(), "%Y-%m-%d").ok()?;
    let time = gametime
        .and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M").ok())
        .unwrap_or_else(|| NaiveTime::from_hms_opt(13, 0, 0).unwrap_or_default());
    let eastern = FixedOffset::west_opt(4 * 3600)?;
    eastern
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|d| d.with_timezone(&Utc))
}

fn describe(row: &ScheduleRow) -> String {
    let stage = match row.game_type.as_str() {
        "REG" => format!("Week {}", row.week),
        "WC" => "Wild Card".to_string(),
        "DIV" => "Divisional".to_string(),
        "CON" => "Conference Championship".to_string(),
        "SB" => "Super Bowl".to_string(),
        other => other.to_string(),
    };
    format!("NFL: {} @ {} ({})", row.away_team, row.home_team, stage)
}

/// Placeholder list served when the schedule source is unavailable.
pub fn placeholder_games() -> Vec<Game> {
    vec![Game {
        id: "2025_01_KC_PHI".to_string(),
        name: "NFL: Chiefs vs Eagles".to_string(),
        start_time: Utc::now(),
    }]
}

/// Schedule passthrough; never empty, never an error.
pub async fn list_games(provider: &dyn ScheduleProvider) -> Vec<Game> {
    match provider.upcoming_games().await {
        Ok(games) if !games.is_empty() => games,
        Ok(_) => {
            tracing::warn!("Schedule returned no upcoming games, serving placeholder");
            placeholder_games()
        }
        Err(e) => {
            tracing::error!("Schedule fetch failed, serving placeholder: {}", e);
            placeholder_games()
        }
    }
}
