use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trueline_backend::{api, cli, config::Settings};

#[derive(Parser)]
#[command(name = "trueline")]
#[command(about = "Scenario-based NFL betting recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List upcoming games
    Games,
    /// Show the live odds board, or one game's market snapshot
    Odds {
        #[arg(short, long)]
        game_id: Option<String>,
    },
    /// Generate betting scenarios for a game
    Scenarios {
        #[arg(short, long)]
        game_id: String,
        #[arg(short, long, default_value = "Balanced")]
        risk: String,
        #[arg(short, long)]
        lines_source: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    let settings = Settings::from_env();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(settings.port);
            tracing::info!("Starting Trueline API server on port {}", port);
            api::serve(settings, port).await?;
        }
        Some(Commands::Games) => {
            cli::show_games(&settings).await?;
        }
        Some(Commands::Odds { game_id }) => {
            cli::show_odds(&settings, game_id.as_deref()).await?;
        }
        Some(Commands::Scenarios { game_id, risk, lines_source }) => {
            cli::generate_scenarios(&settings, &game_id, &risk, lines_source.as_deref()).await?;
        }
        None => {
            // Default to serving
            let port = settings.port;
            tracing::info!("Starting Trueline API server on port {}", port);
            api::serve(settings, port).await?;
        }
    }

    Ok(())
}
