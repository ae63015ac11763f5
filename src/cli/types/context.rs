//! League context: the identifying tuple that scopes every extraction run.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GameId, LeagueId, LeagueKey};
use super::time::Season;

/// Identifies which remote league and season to query.
///
/// Immutable once constructed; every field is private and only read through
/// accessors so a run cannot retarget itself midway.
///
/// # Examples
///
/// ```rust
/// use fantasy_hoops::{GameId, LeagueContext, LeagueId, Season};
///
/// let ctx = LeagueContext::new(GameId::new(402), "nba", Season::new(2020), LeagueId::new(107914));
/// assert_eq!(ctx.league_key().as_str(), "402.l.107914");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueContext {
    game_id: GameId,
    game_code: String,
    season: Season,
    league_id: LeagueId,
}

impl LeagueContext {
    pub fn new(
        game_id: GameId,
        game_code: impl Into<String>,
        season: Season,
        league_id: LeagueId,
    ) -> Self {
        Self {
            game_id,
            game_code: game_code.into().to_lowercase(),
            season,
            league_id,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn game_code(&self) -> &str {
        &self.game_code
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn league_id(&self) -> LeagueId {
        self.league_id
    }

    pub fn league_key(&self) -> LeagueKey {
        LeagueKey::new(self.game_id, self.league_id)
    }
}

impl fmt::Display for LeagueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.game_code,
            self.season,
            self.league_key()
        )
    }
}
