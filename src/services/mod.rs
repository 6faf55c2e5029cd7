pub mod generator;
pub mod odds_fetcher;
pub mod prompt;
pub mod scenario_engine;
pub mod schedule;
pub mod snapshot;

pub use generator::*;
pub use odds_fetcher::*;
pub use prompt::*;
pub use scenario_engine::*;
pub use schedule::*;
pub use snapshot::*;
