//! Normalized entity schema.
//!
//! Every entity here is flat and independent of the payload shape it came
//! from. Optional remote fields are defaulted, never carried as nulls.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::cli::types::{Period, PlayerKey, Position, Season, StatId, TeamKey, Week};


/// Placeholder for absent optional text fields.
pub const UNKNOWN: &str = "unknown";

/// The kinds of entity the store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Player,
    Roster,
    Matchup,
    StatLine,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Team,
        EntityKind::Player,
        EntityKind::Roster,
        EntityKind::Matchup,
        EntityKind::StatLine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Team => "team",
            EntityKind::Player => "player",
            EntityKind::Roster => "roster",
            EntityKind::Matchup => "matchup",
            EntityKind::StatLine => "stat_line",
        }
    }

    /// Backing table in the entity store.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams",
            EntityKind::Player => "players",
            EntityKind::Roster => "rosters",
            EntityKind::Matchup => "matchups",
            EntityKind::StatLine => "stat_lines",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity type the store can persist under a stable key.
pub trait StoredEntity: Serialize + DeserializeOwned + Clone {
    const KIND: EntityKind;

    fn key(&self) -> String;

    fn into_entity(self) -> Entity;

    fn from_entity(entity: Entity) -> Option<Self>;
}

/// Season standing metadata; zeroed when the payload omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub rank: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub team_key: TeamKey,
    pub name: String,
    pub managers: Vec<String>,
    pub standing: Standing,
}

/// Availability designation attached to a player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[default]
    Active,
    DayToDay,
    GameTimeDecision,
    Out,
    Injured,
    Suspended,
    NotActive,
    Other(String),
}

impl PlayerStatus {
    /// Map the API's short status code. Empty means healthy.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "" => PlayerStatus::Active,
            "DTD" => PlayerStatus::DayToDay,
            "GTD" => PlayerStatus::GameTimeDecision,
            "O" => PlayerStatus::Out,
            "INJ" => PlayerStatus::Injured,
            "SUSP" => PlayerStatus::Suspended,
            "NA" => PlayerStatus::NotActive,
            _ => PlayerStatus::Other(code.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_key: PlayerKey,
    pub name: String,
    pub eligible_positions: BTreeSet<Position>,
    pub status: PlayerStatus,
    /// Pro team abbreviation, `"unknown"` when absent.
    pub pro_team: String,
    pub display_position: String,
    pub undroppable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlot {
    pub player_key: PlayerKey,
    pub slot: Position,
}

/// One team's lineup for one scoring period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub team_key: TeamKey,
    pub period: Period,
    pub slots: Vec<RosterSlot>,
}

impl Roster {
    pub fn key_for(team_key: &TeamKey, period: &Period) -> String {
        format!("{}@{}", team_key, period.key_fragment())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSide {
    pub team_key: TeamKey,
    pub totals: BTreeMap<StatId, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchupOutcome {
    Winner(TeamKey),
    Tie,
}

/// A completed head-to-head matchup for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: Week,
    pub sides: [MatchupSide; 2],
    pub outcome: MatchupOutcome,
}

impl Matchup {
    /// Key independent of which side the API listed first.
    pub fn key_for(week: Week, a: &TeamKey, b: &TeamKey) -> String {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        format!("w{:03}:{}|{}", week.as_u16(), lo, hi)
    }

    pub fn team_keys(&self) -> (&TeamKey, &TeamKey) {
        (&self.sides[0].team_key, &self.sides[1].team_key)
    }

    pub fn involves(&self, team: &TeamKey) -> bool {
        self.sides.iter().any(|s| &s.team_key == team)
    }

    /// 1.0 for a win, 0.5 for a tie, 0.0 for a loss or if `team` did not play.
    pub fn result_for(&self, team: &TeamKey) -> f64 {
        if !self.involves(team) {
            return 0.0;
        }
        match &self.outcome {
            MatchupOutcome::Tie => 0.5,
            MatchupOutcome::Winner(w) if w == team => 1.0,
            MatchupOutcome::Winner(_) => 0.0,
        }
    }
}

/// Whose stats a stat line holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Team(TeamKey),
    Player(PlayerKey),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Team(k) => write!(f, "{}", k),
            Subject::Player(k) => write!(f, "{}", k),
        }
    }
}

/// Made/attempted pair for display-only fraction categories such as `FGM/A`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fraction {
    pub made: f64,
    pub attempted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub subject: Subject,
    pub period: Period,
    pub values: BTreeMap<StatId, f64>,
    pub fractions: BTreeMap<StatId, Fraction>,
    pub games_played: u32,
}

impl StatLine {
    pub fn key_for(subject: &Subject, period: &Period) -> String {
        format!("{}@{}", subject, period.key_fragment())
    }
}

/// How a category is compared between teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    Standard,
    /// Lower is better (turnovers).
    Inverse,
    Percentage,
    /// `made/attempted`, shown but never scored.
    Fraction,
}

impl StatKind {
    /// Classify a category from its display name and sort order.
    pub fn classify(display_name: &str, sort_order: &str) -> Self {
        if display_name.contains('/') {
            StatKind::Fraction
        } else if sort_order.trim() == "0" {
            StatKind::Inverse
        } else if display_name.contains('%') {
            StatKind::Percentage
        } else {
            StatKind::Standard
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCategory {
    pub stat_id: StatId,
    pub display_name: String,
    pub kind: StatKind,
    pub display_only: bool,
}

impl StatCategory {
    /// Whether the category decides head-to-head results.
    pub fn is_scoring(&self) -> bool {
        !self.display_only && self.kind != StatKind::Fraction
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlotCount {
    pub position: Position,
    pub count: u32,
}

/// League metadata and settings fetched once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub league_key: String,
    pub name: String,
    pub season: Season,
    pub num_teams: u32,
    pub scoring_type: String,
    pub current_week: Week,
    pub start_week: Week,
    pub end_week: Week,
    pub playoff_start_week: Option<Week>,
    pub is_finished: bool,
    pub stat_categories: Vec<StatCategory>,
    pub roster_positions: Vec<RosterSlotCount>,
}

impl LeagueSettings {
    /// The declared category set stat lines are validated against.
    pub fn category_ids(&self) -> BTreeSet<StatId> {
        self.stat_categories.iter().map(|c| c.stat_id).collect()
    }

    pub fn scoring_categories(&self) -> impl Iterator<Item = &StatCategory> {
        self.stat_categories.iter().filter(|c| c.is_scoring())
    }

    /// Active roster size, excluding injured-list and not-active slots.
    pub fn players_per_team(&self) -> u32 {
        self.roster_positions
            .iter()
            .filter(|r| !r.position.is_reserve_slot())
            .map(|r| r.count)
            .sum()
    }

    pub fn is_head_to_head(&self) -> bool {
        matches!(self.scoring_type.as_str(), "head" | "headone")
    }
}

/// Any normalized entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Team(Team),
    Player(Player),
    Roster(Roster),
    Matchup(Matchup),
    StatLine(StatLine),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Team(_) => EntityKind::Team,
            Entity::Player(_) => EntityKind::Player,
            Entity::Roster(_) => EntityKind::Roster,
            Entity::Matchup(_) => EntityKind::Matchup,
            Entity::StatLine(_) => EntityKind::StatLine,
        }
    }

    pub fn key(&self) -> String {
        match self {
            Entity::Team(e) => e.key(),
            Entity::Player(e) => e.key(),
            Entity::Roster(e) => e.key(),
            Entity::Matchup(e) => e.key(),
            Entity::StatLine(e) => e.key(),
        }
    }
}

macro_rules! stored_entity {
    ($ty:ident, $kind:ident, |$e:ident| $key:expr) => {
        impl StoredEntity for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            fn key(&self) -> String {
                let $e = self;
                $key
            }

            fn into_entity(self) -> Entity {
                Entity::$kind(self)
            }

            fn from_entity(entity: Entity) -> Option<Self> {
                match entity {
                    Entity::$kind(e) => Some(e),
                    _ => None,
                }
            }
        }
    };
}

stored_entity!(Team, Team, |e| e.team_key.to_string());
stored_entity!(Player, Player, |e| e.player_key.to_string());
stored_entity!(Roster, Roster, |e| Roster::key_for(&e.team_key, &e.period));
stored_entity!(Matchup, Matchup, |e| {
    let (a, b) = e.team_keys();
    Matchup::key_for(e.week, a, b)
});
stored_entity!(StatLine, StatLine, |e| StatLine::key_for(&e.subject, &e.period));
