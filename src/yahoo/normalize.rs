//! Response normalizer: raw payloads to flat entities.
//!
//! Shape handling is delegated to [`super::shape`]; this module only decides
//! which fields are required, how optional ones default, and how stat values
//! are parsed. Problems with a single record never fail the page: they are
//! recorded as [`Diagnostic`]s and the record is skipped.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use super::shape::{self, Fields};
use super::types::{
    Entity, EntityKind, Fraction, LeagueSettings, Matchup, MatchupOutcome, MatchupSide, Player,
    PlayerStatus, Roster, RosterSlot, Standing, StatKind, StatLine, StoredEntity, Subject, Team,
    UNKNOWN,
};
use crate::cli::types::{Period, PlayerKey, Position, Season, StatId, TeamKey, Week};

#[cfg(test)]
mod tests;

/// A non-fatal problem found while normalizing a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A record lacked a required field and was skipped.
    MalformedEntity {
        kind: EntityKind,
        index: usize,
        reason: String,
    },
    /// A stat value that is not a number; excluded from the stat line.
    UnparseableStat {
        subject: String,
        stat_id: StatId,
        raw: String,
    },
    /// A stat id outside the league's declared categories; dropped.
    UnknownCategory { subject: String, stat_id: StatId },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedEntity {
                kind,
                index,
                reason,
            } => write!(f, "malformed {} at index {}: {}", kind, index, reason),
            Diagnostic::UnparseableStat {
                subject,
                stat_id,
                raw,
            } => write!(f, "unparseable stat {} for {}: {:?}", stat_id, subject, raw),
            Diagnostic::UnknownCategory { subject, stat_id } => {
                write!(f, "unknown stat category {} for {}", stat_id, subject)
            }
        }
    }
}

/// Entities from one payload, in payload order, with what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub entities: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
    /// Records intentionally left out, such as matchups still in progress.
    pub skipped: usize,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            diagnostics: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Normalized<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Normalized<U> {
        Normalized {
            entities: self.entities.into_iter().map(f).collect(),
            diagnostics: self.diagnostics,
            skipped: self.skipped,
        }
    }

    fn malformed(&mut self, kind: EntityKind, index: usize, reason: impl Into<String>) {
        let diagnostic = Diagnostic::MalformedEntity {
            kind,
            index,
            reason: reason.into(),
        };
        warn!("Skipping {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// The league's declared stat categories and how each one parses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Categories(BTreeMap<StatId, StatKind>);

impl Categories {
    pub fn new(categories: impl IntoIterator<Item = (StatId, StatKind)>) -> Self {
        Self(categories.into_iter().collect())
    }

    pub fn from_settings(settings: &LeagueSettings) -> Self {
        Self::new(settings.stat_categories.iter().map(|c| (c.stat_id, c.kind)))
    }

    pub fn kind(&self, stat_id: StatId) -> Option<StatKind> {
        self.0.get(&stat_id).copied()
    }
}

/// Normalize a payload into entities of one kind.
pub fn normalize(payload: &Value, kind: EntityKind, categories: &Categories) -> Normalized<Entity> {
    match kind {
        EntityKind::Team => normalize_teams(payload).map(StoredEntity::into_entity),
        EntityKind::Player => normalize_players(payload).map(StoredEntity::into_entity),
        EntityKind::Roster => normalize_rosters(payload).map(StoredEntity::into_entity),
        EntityKind::Matchup => normalize_matchups(payload, categories).map(StoredEntity::into_entity),
        EntityKind::StatLine => {
            normalize_stat_lines(payload, categories).map(StoredEntity::into_entity)
        }
    }
}

/// Records of a collection, or the single record when the payload is one object.
fn records<'a>(payload: &'a Value, plural: &str, singular: &str) -> Vec<&'a Value> {
    if let Some(collection) = shape::find_key(payload, plural) {
        return shape::collection(collection, singular);
    }
    shape::find_key(payload, singular).into_iter().collect()
}

fn team_key(f: &Fields<'_>) -> Option<TeamKey> {
    shape::text(f, "team_key")?.parse().ok()
}

fn player_key(f: &Fields<'_>) -> Option<PlayerKey> {
    shape::text(f, "player_key")?.parse().ok()
}

/// Period from `coverage_type` plus the matching value field.
fn coverage(f: &Fields<'_>) -> Option<Period> {
    let week = || shape::uint(f, "week").and_then(|w| u16::try_from(w).ok()).map(Week::new);
    match shape::text(f, "coverage_type").as_deref() {
        Some("week") => week().map(Period::Week),
        Some("date") => shape::text(f, "date").map(Period::Date),
        Some("season") => shape::uint(f, "season")
            .and_then(|s| u16::try_from(s).ok())
            .map(|s| Period::Season(Season::new(s))),
        _ => week()
            .map(Period::Week)
            .or_else(|| shape::text(f, "date").map(Period::Date)),
    }
}

pub fn normalize_teams(payload: &Value) -> Normalized<Team> {
    let mut out = Normalized::default();

    for (index, record) in records(payload, "teams", "team").into_iter().enumerate() {
        let f = shape::fields(record);
        let Some(team_key) = team_key(&f) else {
            out.malformed(EntityKind::Team, index, "missing team_key");
            continue;
        };
        let Some(name) = shape::text(&f, "name") else {
            out.malformed(EntityKind::Team, index, format!("{} missing name", team_key));
            continue;
        };

        let managers = f
            .get("managers")
            .map(|m| {
                shape::collection(m, "manager")
                    .into_iter()
                    .filter_map(|mgr| shape::text(&shape::fields(mgr), "nickname"))
                    .collect()
            })
            .unwrap_or_default();

        let standings = shape::sub_fields(&f, "team_standings");
        let totals = shape::sub_fields(&standings, "outcome_totals");
        let standing = Standing {
            rank: shape::uint(&standings, "rank").unwrap_or(0),
            wins: shape::uint(&totals, "wins").unwrap_or(0),
            losses: shape::uint(&totals, "losses").unwrap_or(0),
            ties: shape::uint(&totals, "ties").unwrap_or(0),
        };

        out.entities.push(Team {
            team_key,
            name,
            managers,
            standing,
        });
    }

    out
}

fn player_from_fields(f: &Fields<'_>) -> std::result::Result<Player, String> {
    let player_key = player_key(f).ok_or("missing player_key")?;
    let name = shape::text(&shape::sub_fields(f, "name"), "full")
        .ok_or_else(|| format!("{} missing name.full", player_key))?;

    let eligible_positions = f
        .get("eligible_positions")
        .map(|p| {
            shape::collection(p, "position")
                .into_iter()
                .filter_map(Value::as_str)
                .map(|p| Position::from(p.to_string()))
                .collect()
        })
        .unwrap_or_default();

    Ok(Player {
        player_key,
        name,
        eligible_positions,
        status: shape::text(f, "status")
            .map(|s| PlayerStatus::from_code(&s))
            .unwrap_or_default(),
        pro_team: shape::text(f, "editorial_team_abbr").unwrap_or_else(|| UNKNOWN.to_string()),
        display_position: shape::text(f, "display_position")
            .unwrap_or_else(|| UNKNOWN.to_string()),
        undroppable: shape::flag(f, "is_undroppable"),
    })
}

/// Players from a players collection or from the players inside a roster.
pub fn normalize_players(payload: &Value) -> Normalized<Player> {
    let mut out = Normalized::default();

    for (index, record) in records(payload, "players", "player").into_iter().enumerate() {
        match player_from_fields(&shape::fields(record)) {
            Ok(player) => out.entities.push(player),
            Err(reason) => out.malformed(EntityKind::Player, index, reason),
        }
    }

    out
}

pub fn normalize_rosters(payload: &Value) -> Normalized<Roster> {
    let mut out = Normalized::default();

    for (index, record) in records(payload, "teams", "team").into_iter().enumerate() {
        let f = shape::fields(record);
        let Some(team_key) = team_key(&f) else {
            out.malformed(EntityKind::Roster, index, "missing team_key");
            continue;
        };
        let Some(roster) = f.get("roster") else {
            out.malformed(EntityKind::Roster, index, format!("{} has no roster", team_key));
            continue;
        };
        let rf = shape::fields(roster);
        let Some(period) = coverage(&rf) else {
            out.malformed(
                EntityKind::Roster,
                index,
                format!("{} roster has no coverage period", team_key),
            );
            continue;
        };

        let players = rf
            .get("players")
            .map(|p| shape::collection(p, "player"))
            .unwrap_or_default();
        let mut slots = Vec::with_capacity(players.len());
        for (slot_index, player) in players.into_iter().enumerate() {
            let pf = shape::fields(player);
            let selected = shape::sub_fields(&pf, "selected_position");
            match (player_key(&pf), shape::text(&selected, "position")) {
                (Some(player_key), Some(slot)) => slots.push(RosterSlot {
                    player_key,
                    slot: Position::from(slot),
                }),
                _ => out.malformed(
                    EntityKind::Roster,
                    index,
                    format!(
                        "{} slot {} lacks player_key or selected_position",
                        team_key, slot_index
                    ),
                ),
            }
        }

        out.entities.push(Roster {
            team_key,
            period,
            slots,
        });
    }

    out
}

/// Parsed stat values of one subject.
#[derive(Debug, Default)]
struct StatValues {
    values: BTreeMap<StatId, f64>,
    fractions: BTreeMap<StatId, Fraction>,
}

/// Locale-invariant number; `None` for anything that is not a finite decimal.
fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_fraction(raw: &str) -> Option<Fraction> {
    let (made, attempted) = raw.trim().split_once('/')?;
    let part = |s: &str| match s.trim() {
        "-" | "" => Some(0.0),
        other => parse_number(other),
    };
    Some(Fraction {
        made: part(made)?,
        attempted: part(attempted)?,
    })
}

fn parse_stats(
    stats: Option<&Value>,
    subject: &Subject,
    categories: &Categories,
    diagnostics: &mut Vec<Diagnostic>,
) -> StatValues {
    let mut out = StatValues::default();
    let Some(stats) = stats else {
        return out;
    };

    for stat in shape::collection(stats, "stat") {
        let sf = shape::fields(stat);
        let Some(stat_id) = shape::uint(&sf, "stat_id").map(StatId::new) else {
            continue;
        };
        let Some(kind) = categories.kind(stat_id) else {
            warn!("Dropping unknown stat category {} for {}", stat_id, subject);
            diagnostics.push(Diagnostic::UnknownCategory {
                subject: subject.to_string(),
                stat_id,
            });
            continue;
        };

        let raw = match sf.get("value") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => s.trim().to_string(),
            _ => String::new(),
        };
        if raw.is_empty() || raw == "-" {
            continue;
        }

        let parsed = match kind {
            StatKind::Fraction => parse_fraction(&raw).map(|f| {
                out.fractions.insert(stat_id, f);
            }),
            _ => parse_number(&raw).map(|v| {
                out.values.insert(stat_id, v);
            }),
        };
        if parsed.is_none() {
            warn!("Unparseable value {:?} for stat {} of {}", raw, stat_id, subject);
            diagnostics.push(Diagnostic::UnparseableStat {
                subject: subject.to_string(),
                stat_id,
                raw,
            });
        }
    }

    out
}

fn stats_of<'a>(f: &Fields<'a>, stats_key: &str) -> Option<(Period, Option<&'a Value>)> {
    let block = f.get(stats_key)?;
    let bf = shape::fields(block);
    Some((coverage(&bf)?, bf.get("stats").copied()))
}

pub fn normalize_stat_lines(payload: &Value, categories: &Categories) -> Normalized<StatLine> {
    let mut out = Normalized::default();

    for (index, record) in records(payload, "teams", "team").into_iter().enumerate() {
        let f = shape::fields(record);
        let Some(team_key) = team_key(&f) else {
            out.malformed(EntityKind::StatLine, index, "missing team_key");
            continue;
        };
        let Some((period, stats)) = stats_of(&f, "team_stats") else {
            out.malformed(
                EntityKind::StatLine,
                index,
                format!("{} has no team_stats coverage", team_key),
            );
            continue;
        };

        let remaining = shape::sub_fields(&f, "team_remaining_games");
        let games_played = shape::uint(&shape::sub_fields(&remaining, "total"), "completed_games")
            .unwrap_or(0);

        let subject = Subject::Team(team_key);
        let parsed = parse_stats(stats, &subject, categories, &mut out.diagnostics);
        out.entities.push(StatLine {
            subject,
            period,
            values: parsed.values,
            fractions: parsed.fractions,
            games_played,
        });
    }

    if shape::find_key(payload, "player_stats").is_some() {
        for (index, record) in records(payload, "players", "player").into_iter().enumerate() {
            let f = shape::fields(record);
            let Some(player_key) = player_key(&f) else {
                out.malformed(EntityKind::StatLine, index, "missing player_key");
                continue;
            };
            let Some((period, stats)) = stats_of(&f, "player_stats") else {
                continue;
            };
            let subject = Subject::Player(player_key);
            let parsed = parse_stats(stats, &subject, categories, &mut out.diagnostics);
            out.entities.push(StatLine {
                subject,
                period,
                values: parsed.values,
                fractions: parsed.fractions,
                games_played: 0,
            });
        }
    }

    out
}

/// Completed matchups from a scoreboard. Matchups still in progress are skipped.
pub fn normalize_matchups(payload: &Value, categories: &Categories) -> Normalized<Matchup> {
    let mut out = Normalized::default();

    for (index, record) in records(payload, "matchups", "matchup")
        .into_iter()
        .enumerate()
    {
        let f = shape::fields(record);
        if shape::text(&f, "status").as_deref() != Some("postevent") {
            out.skipped += 1;
            continue;
        }
        let Some(week) = shape::uint(&f, "week").and_then(|w| u16::try_from(w).ok()) else {
            out.malformed(EntityKind::Matchup, index, "missing week");
            continue;
        };
        let week = Week::new(week);

        let teams = f
            .get("teams")
            .map(|t| shape::collection(t, "team"))
            .unwrap_or_default();
        let mut sides = Vec::with_capacity(2);
        for team in &teams {
            let tf = shape::fields(team);
            let Some(key) = team_key(&tf) else {
                break;
            };
            let subject = Subject::Team(key.clone());
            let stats = shape::sub_fields(&tf, "team_stats").get("stats").copied();
            let parsed = parse_stats(stats, &subject, categories, &mut out.diagnostics);
            sides.push(MatchupSide {
                team_key: key,
                totals: parsed.values,
            });
        }
        let sides: [MatchupSide; 2] = match sides.try_into() {
            Ok(sides) if teams.len() == 2 => sides,
            _ => {
                out.malformed(
                    EntityKind::Matchup,
                    index,
                    format!("week {} matchup needs exactly two keyed teams", week),
                );
                continue;
            }
        };

        let outcome = if shape::flag(&f, "is_tied") {
            Some(MatchupOutcome::Tie)
        } else {
            shape::text(&f, "winner_team_key")
                .and_then(|k| k.parse::<TeamKey>().ok())
                .filter(|k| sides.iter().any(|s| &s.team_key == k))
                .map(MatchupOutcome::Winner)
        };
        let Some(outcome) = outcome else {
            out.malformed(
                EntityKind::Matchup,
                index,
                format!("week {} matchup has neither a winner nor a tie", week),
            );
            continue;
        };

        out.entities.push(Matchup {
            week,
            sides,
            outcome,
        });
    }

    out
}
