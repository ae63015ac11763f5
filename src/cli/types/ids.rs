//! ID and key types for Yahoo fantasy basketball resources.
//!
//! Yahoo addresses every resource by a dotted key built from its parent's key:
//! a league is `{game_id}.l.{league_id}`, a team inside it is
//! `{league_key}.t.{team_id}` and a player is `{game_id}.p.{player_id}`.
//! Entities are always keyed by these remote keys, never by position.

use crate::error::{HoopsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Yahoo game IDs (one per sport and season, e.g. `428` for NBA 2023).
///
/// # Examples
///
/// ```rust
/// use fantasy_hoops::GameId;
///
/// let game_id = GameId::new(428);
/// assert_eq!(game_id.as_u32(), 428);
/// assert_eq!(game_id.to_string(), "428");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u32);

impl GameId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameId {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// Type-safe wrapper for Yahoo league IDs.
///
/// # Examples
///
/// ```rust
/// use fantasy_hoops::LeagueId;
///
/// let league_id = LeagueId::new(107914);
/// assert_eq!(league_id.as_u32(), 107914);
/// assert_eq!(league_id.to_string(), "107914");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueId(pub u32);

impl LeagueId {
    /// Create a new LeagueId from a u32 value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeagueId {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// League key, `{game_id}.l.{league_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeagueKey(String);

impl LeagueKey {
    pub fn new(game_id: GameId, league_id: LeagueId) -> Self {
        Self(format!("{}.l.{}", game_id, league_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the team with the given numeric id in this league.
    pub fn team(&self, team_id: u32) -> TeamKey {
        TeamKey(format!("{}.t.{}", self.0, team_id))
    }
}

impl fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Team key, `{game_id}.l.{league_id}.t.{team_id}`. Unique within its league.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamKey(String);

impl TeamKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric team id (the last dotted component).
    pub fn team_id(&self) -> Option<u32> {
        self.0.rsplit('.').next()?.parse().ok()
    }

    /// The league this team belongs to.
    pub fn league_key(&self) -> Option<LeagueKey> {
        self.0
            .rsplit_once(".t.")
            .map(|(league, _)| LeagueKey(league.to_string()))
    }
}

impl fmt::Display for TeamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TeamKey {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.rsplit_once(".t.") {
            Some((league, id)) if league.contains(".l.") && id.parse::<u32>().is_ok() => {
                Ok(Self(s.to_string()))
            }
            _ => Err(HoopsError::InvalidKey { key: s.to_string() }),
        }
    }
}

/// Player key, `{game_id}.p.{player_id}`. Globally unique within a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey(String);

impl PlayerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PlayerKey {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(".p.") {
            Some((game, id)) if !game.is_empty() && !id.is_empty() => Ok(Self(s.to_string())),
            _ => Err(HoopsError::InvalidKey { key: s.to_string() }),
        }
    }
}

/// Stat category id as declared in the league settings (e.g. `5` = FG%).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StatId(pub u32);

impl StatId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StatId {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}
