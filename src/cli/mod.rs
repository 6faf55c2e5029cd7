use anyhow::Result;

use crate::api::AppState;
use crate::config::Settings;
use crate::models::ScenarioRequest;
use crate::services::{list_games, MarketSnapshotBuilder, NflTeamMatcher};

pub async fn show_games(settings: &Settings) -> Result<()> {
    let state = AppState::from_settings(settings)?;

    println!("🏈 Fetching upcoming games...");
    let games = list_games(state.schedule.as_ref()).await;

    for game in &games {
        println!("  {:<18} {:<40} {}",
            game.id,
            game.name,
            game.start_time.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!("✅ {} games", games.len());
    Ok(())
}

pub async fn show_odds(settings: &Settings, game_id: Option<&str>) -> Result<()> {
    let state = AppState::from_settings(settings)?;

    println!("📥 Fetching odds board...");
    let events = state.odds.fetch_odds().await?;

    let Some(game_id) = game_id else {
        for event in &events {
            let books = event.bookmakers.len();
            println!("  {} @ {} ({} books)", event.away_team, event.home_team, books);
        }
        println!("✅ {} events", events.len());
        return Ok(());
    };

    match MarketSnapshotBuilder::new(&NflTeamMatcher).build(game_id, &events) {
        Some(snapshot) => {
            println!("📊 {} via {}", game_id, snapshot.book_used);
            for market in &snapshot.markets {
                println!("  [{}]", market.key);
                for outcome in &market.outcomes {
                    println!("    {:<28} {:>7} {}",
                        outcome.name,
                        crate::utils::format_american(outcome.price),
                        outcome.point.map_or(String::new(), |p| format!("({:+})", p))
                    );
                }
            }
        }
        None => println!("📭 No live market found for {}", game_id),
    }
    Ok(())
}

pub async fn generate_scenarios(
    settings: &Settings,
    game_id: &str,
    risk_profile: &str,
    lines_source: Option<&str>,
) -> Result<()> {
    let state = AppState::from_settings(settings)?;

    let mut request = ScenarioRequest::new(game_id, risk_profile);
    if let Some(source) = lines_source {
        request.lines_source = source.to_string();
    }

    println!("🔮 Generating {} scenarios for {}...", request.risk_profile, request.game_id);
    let response = state.engine.generate_scenarios(&request).await;

    println!("📚 Book: {} | Lines as of {}",
        response.book_used,
        response.lines_timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for (i, scenario) in response.scenarios.iter().enumerate() {
        let bet = &scenario.best_bet;
        println!("\n{}. {} ({:.0}%)", i + 1, scenario.summary, scenario.probability * 100.0);
        println!("   Best bet: {} @ {} | implied {:.1}% | edge {:+.1}%",
            bet.wager,
            bet.odds,
            bet.implied_prob * 100.0,
            bet.model_edge * 100.0
        );
        if let Some(parlay) = &scenario.quarter_spread_parlay {
            println!("   Quarter parlay: {}", parlay.join(" | "));
        }
        if let Some(explanation) = &scenario.explanation {
            println!("   {}", explanation);
        }
        if let Some(reasoning) = &scenario.reasoning {
            println!("   Reasoning: {}", reasoning);
        }
    }

    Ok(())
}
