use crate::models::{Market, OddsEvent};

/// Parsed form of a `season_week_away_home` game id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameKey<'a> {
    pub season: &'a str,
    pub week: &'a str,
    pub away: &'a str,
    pub home: &'a str,
}

impl<'a> GameKey<'a> {
    /// `None` when the id has fewer than four `_`-separated parts.
    pub fn parse(game_id: &'a str) -> Option<Self> {
        let parts: Vec<&str> = game_id.split('_').collect();
        if parts.len() < 4 {
            return None;
        }
        Some(Self {
            season: parts[0],
            week: parts[1],
            away: parts[2],
            home: parts[3],
        })
    }
}

/// Decides whether a schedule abbreviation and an odds-feed team name refer to
/// the same team.
pub trait TeamMatcher: Send + Sync {
    fn matches(&self, abbreviation: &str, team: &str) -> bool;
}

/// Containment in either direction, case-sensitive.
///
/// Loose on purpose: providers disagree on abbreviations. Short codes that
/// are substrings of others ("LA" inside "LAC") can match the wrong game.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl TeamMatcher for SubstringMatcher {
    fn matches(&self, abbreviation: &str, team: &str) -> bool {
        team.contains(abbreviation) || abbreviation.contains(team)
    }
}

/// Substring rule first, then an NFL alias table so "KC" or "KAN" finds
/// "Kansas City Chiefs" as The Odds API spells it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NflTeamMatcher;

// (abbreviations, franchise name as listed by the odds feed)
const NFL_TEAMS: &[(&[&str], &str)] = &[
    (&["ARI", "ARZ"], "Arizona Cardinals"),
    (&["ATL"], "Atlanta Falcons"),
    (&["BAL", "BLT"], "Baltimore Ravens"),
    (&["BUF"], "Buffalo Bills"),
    (&["CAR"], "Carolina Panthers"),
    (&["CHI"], "Chicago Bears"),
    (&["CIN"], "Cincinnati Bengals"),
    (&["CLE", "CLV"], "Cleveland Browns"),
    (&["DAL"], "Dallas Cowboys"),
    (&["DEN"], "Denver Broncos"),
    (&["DET"], "Detroit Lions"),
    (&["GB", "GNB"], "Green Bay Packers"),
    (&["HOU", "HST"], "Houston Texans"),
    (&["IND"], "Indianapolis Colts"),
    (&["JAX", "JAC"], "Jacksonville Jaguars"),
    (&["KC", "KAN"], "Kansas City Chiefs"),
    (&["LV", "LVR", "OAK"], "Las Vegas Raiders"),
    (&["LAC", "SD"], "Los Angeles Chargers"),
    (&["LA", "LAR", "STL"], "Los Angeles Rams"),
    (&["MIA"], "Miami Dolphins"),
    (&["MIN"], "Minnesota Vikings"),
    (&["NE", "NWE"], "New England Patriots"),
    (&["NO", "NOR"], "New Orleans Saints"),
    (&["NYG"], "New York Giants"),
    (&["NYJ"], "New York Jets"),
    (&["PHI"], "Philadelphia Eagles"),
    (&["PIT"], "Pittsburgh Steelers"),
    (&["SF", "SFO"], "San Francisco 49ers"),
    (&["SEA"], "Seattle Seahawks"),
    (&["TB", "TAM"], "Tampa Bay Buccaneers"),
    (&["TEN"], "Tennessee Titans"),
    (&["WAS", "WSH"], "Washington Commanders"),
];

impl NflTeamMatcher {
    fn franchise(code: &str) -> Option<(&'static [&'static str], &'static str)> {
        let code = code.trim();
        NFL_TEAMS
            .iter()
            .find(|(codes, _)| codes.iter().any(|c| c.eq_ignore_ascii_case(code)))
            .copied()
    }
}

impl TeamMatcher for NflTeamMatcher {
    fn matches(&self, abbreviation: &str, team: &str) -> bool {
        if SubstringMatcher.matches(abbreviation, team) {
            return true;
        }
        let Some((codes, name)) = Self::franchise(abbreviation) else {
            return false;
        };
        let team = team.trim();
        team.eq_ignore_ascii_case(name) || codes.iter().any(|c| c.eq_ignore_ascii_case(team))
    }
}

/// One bookmaker's markets for the requested game. Lives only as long as the
/// request that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub book_used: String,
    pub markets: Vec<Market>,
}

pub struct MarketSnapshotBuilder<'m> {
    matcher: &'m dyn TeamMatcher,
}

impl<'m> MarketSnapshotBuilder<'m> {
    pub fn new(matcher: &'m dyn TeamMatcher) -> Self {
        Self { matcher }
    }

    /// First event whose away and home teams both match the id.
    pub fn find_event<'e>(&self, game_id: &str, events: &'e [OddsEvent]) -> Option<&'e OddsEvent> {
        let key = GameKey::parse(game_id)?;
        events.iter().find(|event| {
            self.matcher.matches(key.away, &event.away_team)
                && self.matcher.matches(key.home, &event.home_team)
        })
    }

    /// Snapshot of the first bookmaker on the matching event.
    ///
    /// `None` means "proceed without live odds": short id, no matching event,
    /// or an event with no bookmakers.
    pub fn build(&self, game_id: &str, events: &[OddsEvent]) -> Option<MarketSnapshot> {
        let Some(event) = self.find_event(game_id, events) else {
            tracing::debug!("Snapshot: no odds event for {}", game_id);
            return None;
        };
        let Some(book) = event.bookmakers.first() else {
            tracing::debug!(
                "Snapshot: {} @ {} has no bookmakers",
                event.away_team, event.home_team
            );
            return None;
        };

        tracing::debug!(
            "Snapshot: {} @ {} via {} ({} markets)",
            event.away_team,
            event.home_team,
            book.title,
            book.markets.len()
        );

        Some(MarketSnapshot {
            book_used: book.title.clone(),
            markets: book.markets.clone(),
        })
    }
}
