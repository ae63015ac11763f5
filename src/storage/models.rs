//! Views returned by report-layer queries

use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::types::{StatId, TeamKey};
use crate::yahoo::types::{Matchup, Player, Roster, RosterSlot, Team};

/// A matchup with both of its teams resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupView {
    pub matchup: Matchup,
    pub teams: [Team; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub slot: RosterSlot,
    pub player: Player,
}

/// A roster with every slot's player resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterView {
    pub roster: Roster,
    pub team: Team,
    pub entries: Vec<RosterEntry>,
}

/// Season head-to-head record computed from stored matchups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRecord {
    pub team: Team,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl TeamRecord {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Ties count as half a win.
    pub fn win_pct(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (self.wins as f64 + 0.5 * self.ties as f64) / games as f64,
        }
    }
}

/// One team's row in the weekly all-play table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyScore {
    pub team_key: TeamKey,
    pub team_name: String,
    /// Points per category: one per opponent beaten, half per tie.
    pub category_points: BTreeMap<StatId, f64>,
    pub total: f64,
    /// All-play matchup wins: one per opponent out-scored on categories, half per even split.
    pub matchup_wins: f64,
    /// The head-to-head result actually recorded for the week.
    pub week_result: Option<f64>,
}
