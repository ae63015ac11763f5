//! Report-layer queries that dereference stored entities.
//!
//! References are checked here, not at upsert time: a matchup or roster that
//! points at a team or player missing from the store yields
//! `DanglingReference` instead of a half-empty record.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{models::*, schema::EntityStore};
use crate::cli::types::{Period, PlayerKey, StatId, TeamKey, Week};
use crate::yahoo::types::{
    Matchup, MatchupOutcome, Player, Roster, StatCategory, StatKind, StatLine, StoredEntity,
    Subject, Team,
};
use crate::{HoopsError, Result};

impl EntityStore {
    fn resolve<T: StoredEntity>(&self, from: &str, key: &str) -> Result<T> {
        self.find_as(key)?
            .ok_or_else(|| HoopsError::DanglingReference {
                from: from.to_string(),
                missing: format!("{} {}", T::KIND, key),
            })
    }

    pub fn resolve_team(&self, from: &str, key: &TeamKey) -> Result<Team> {
        self.resolve(from, key.as_str())
    }

    pub fn resolve_player(&self, from: &str, key: &PlayerKey) -> Result<Player> {
        self.resolve(from, key.as_str())
    }

    fn view_matchup(&self, matchup: Matchup) -> Result<MatchupView> {
        let from = format!("matchup {}", matchup.key());
        let (a, b) = matchup.team_keys();
        let teams = [self.resolve_team(&from, a)?, self.resolve_team(&from, b)?];
        Ok(MatchupView { matchup, teams })
    }

    /// A stored matchup with both teams attached.
    pub fn matchup_view(&self, key: &str) -> Result<MatchupView> {
        self.view_matchup(self.get_as::<Matchup>(key)?)
    }

    pub fn matchups_for_week(&self, week: Week) -> Result<Vec<MatchupView>> {
        self.week_matchups(week)?
            .into_iter()
            .map(|m| self.view_matchup(m))
            .collect()
    }

    fn week_matchups(&self, week: Week) -> Result<Vec<Matchup>> {
        self.like_as::<Matchup>(&format!("w{:03}:%", week.as_u16()))
    }

    /// A team's roster for a period with every slot's player attached.
    pub fn roster_view(&self, team: &TeamKey, period: &Period) -> Result<RosterView> {
        let roster = self.get_as::<Roster>(&Roster::key_for(team, period))?;
        let from = format!("roster {}", roster.key());
        let team = self.resolve_team(&from, &roster.team_key)?;

        let entries = roster
            .slots
            .iter()
            .map(|slot| {
                Ok(RosterEntry {
                    slot: slot.clone(),
                    player: self.resolve_player(&from, &slot.player_key)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RosterView {
            roster,
            team,
            entries,
        })
    }

    /// Season records from stored matchups, best first.
    ///
    /// Every stored team is listed, including ones with no completed matchups.
    /// Sorted by wins, then ties, then team key.
    pub fn team_records(&self) -> Result<Vec<TeamRecord>> {
        let mut records: BTreeMap<TeamKey, TeamRecord> = self
            .all_as::<Team>()?
            .into_iter()
            .map(|team| {
                (
                    team.team_key.clone(),
                    TeamRecord {
                        team,
                        wins: 0,
                        losses: 0,
                        ties: 0,
                    },
                )
            })
            .collect();

        for matchup in self.all_as::<Matchup>()? {
            let from = format!("matchup {}", matchup.key());
            for side in &matchup.sides {
                if !records.contains_key(&side.team_key) {
                    return Err(HoopsError::DanglingReference {
                        from,
                        missing: format!("team {}", side.team_key),
                    });
                }
            }
            for side in &matchup.sides {
                if let Some(record) = records.get_mut(&side.team_key) {
                    match &matchup.outcome {
                        MatchupOutcome::Tie => record.ties += 1,
                        MatchupOutcome::Winner(w) if w == &side.team_key => record.wins += 1,
                        MatchupOutcome::Winner(_) => record.losses += 1,
                    }
                }
            }
        }

        let mut records: Vec<TeamRecord> = records.into_values().collect();
        records.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.ties.cmp(&a.ties))
                .then_with(|| a.team.team_key.cmp(&b.team.team_key))
        });
        Ok(records)
    }

    /// Team stat lines stored for a week, ordered by team key.
    pub fn team_stat_lines(&self, week: Week) -> Result<Vec<StatLine>> {
        let suffix = Period::Week(week).key_fragment();
        Ok(self
            .like_as::<StatLine>(&format!("%@{}", suffix))?
            .into_iter()
            .filter(|line| matches!(line.subject, Subject::Team(_)))
            .collect())
    }

    /// The all-play table for one week.
    ///
    /// Each team is compared against every other team in each scoring
    /// category: one point per opponent beaten, half per tie. Inverse
    /// categories compare reversed and display-only categories are ignored.
    /// A team missing a category value is left out of that category.
    /// `week_result` is the team's actual head-to-head result, if its
    /// matchup is stored.
    /// Rows are sorted by total, then all-play matchup wins, then team key.
    pub fn weekly_category_scores(
        &self,
        week: Week,
        categories: &[StatCategory],
    ) -> Result<Vec<WeeklyScore>> {
        let lines = self.team_stat_lines(week)?;
        let matchups = self.week_matchups(week)?;
        let scoring: Vec<&StatCategory> = categories.iter().filter(|c| c.is_scoring()).collect();

        let mut rows = Vec::with_capacity(lines.len());
        for line in &lines {
            let Subject::Team(team_key) = &line.subject else {
                continue;
            };
            let team = self.resolve_team(&format!("stat line {}", line.key()), team_key)?;

            let mut category_points = BTreeMap::new();
            for category in &scoring {
                let Some(points) = category_points_for(line, &lines, category) else {
                    continue;
                };
                category_points.insert(category.stat_id, points);
            }

            let matchup_wins: f64 = lines
                .iter()
                .filter(|other| other.subject != line.subject)
                .map(|other| {
                    let advantage: i32 = scoring
                        .iter()
                        .filter_map(|c| compare(line, other, c))
                        .map(|o| match o {
                            Ordering::Greater => 1,
                            Ordering::Equal => 0,
                            Ordering::Less => -1,
                        })
                        .sum();
                    match advantage.cmp(&0) {
                        Ordering::Greater => 1.0,
                        Ordering::Equal => 0.5,
                        Ordering::Less => 0.0,
                    }
                })
                .sum();

            let week_result = matchups
                .iter()
                .find(|m| m.involves(team_key))
                .map(|m| m.result_for(team_key));

            rows.push(WeeklyScore {
                team_key: team_key.clone(),
                team_name: team.name,
                total: category_points.values().sum(),
                category_points,
                matchup_wins,
                week_result,
            });
        }

        rows.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then(b.matchup_wins.total_cmp(&a.matchup_wins))
                .then_with(|| a.team_key.cmp(&b.team_key))
        });
        Ok(rows)
    }
}

fn value(line: &StatLine, stat_id: StatId) -> Option<f64> {
    line.values.get(&stat_id).copied()
}

/// How `line` fares against `other` in one category, better is `Greater`.
fn compare(line: &StatLine, other: &StatLine, category: &StatCategory) -> Option<Ordering> {
    let mine = value(line, category.stat_id)?;
    let theirs = value(other, category.stat_id)?;
    let ordering = mine.partial_cmp(&theirs)?;
    Some(match category.kind {
        StatKind::Inverse => ordering.reverse(),
        _ => ordering,
    })
}

fn category_points_for(line: &StatLine, lines: &[StatLine], category: &StatCategory) -> Option<f64> {
    value(line, category.stat_id)?;
    Some(
        lines
            .iter()
            .filter(|other| other.subject != line.subject)
            .filter_map(|other| compare(line, other, category))
            .map(|o| match o {
                Ordering::Greater => 1.0,
                Ordering::Equal => 0.5,
                Ordering::Less => 0.0,
            })
            .sum(),
    )
}
