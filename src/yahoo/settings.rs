//! League settings: fetch, normalize and cache on disk.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::endpoints::{EndpointClient, Resource};
use super::shape::{self, Fields};
use super::types::{LeagueSettings, RosterSlotCount, StatCategory, StatKind};
use crate::cli::types::{LeagueContext, Position, Season, StatId, Week};
use crate::core::session::SessionProvider;
use crate::core::{try_read_to_string, write_string};
use crate::{HoopsError, Result};

/// What may be found in the settings cache file.
///
/// Normally the normalized settings; a raw API payload is accepted too so a
/// response saved by hand can seed the cache.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CachedLeagueSettings {
    Direct(LeagueSettings),
    Envelope { fantasy_content: Value },
}

impl CachedLeagueSettings {
    fn into_settings(self) -> Result<LeagueSettings> {
        match self {
            CachedLeagueSettings::Direct(settings) => Ok(settings),
            CachedLeagueSettings::Envelope { fantasy_content } => {
                normalize_league_settings(&fantasy_content)
            }
        }
    }
}

fn week(f: &Fields<'_>, key: &str) -> Option<Week> {
    shape::uint(f, key)
        .and_then(|w| u16::try_from(w).ok())
        .map(Week::new)
}

fn required<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| HoopsError::MalformedSettings {
        reason: format!("missing {}", field),
    })
}

/// Build [`LeagueSettings`] from a `league/<key>/settings` payload.
///
/// Rejects leagues that are not head-to-head.
pub fn normalize_league_settings(payload: &Value) -> Result<LeagueSettings> {
    let league = required(shape::find_key(payload, "league"), "league")?;
    let lf = shape::fields(league);
    let sf = shape::sub_fields(&lf, "settings");

    let league_key = required(shape::text(&lf, "league_key"), "league_key")?;
    let scoring_type = required(shape::text(&lf, "scoring_type"), "scoring_type")?;

    let stat_categories: Vec<StatCategory> = shape::sub_fields(&sf, "stat_categories")
        .get("stats")
        .map(|stats| shape::collection(stats, "stat"))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|stat| {
            let f = shape::fields(stat);
            if shape::text(&f, "enabled").as_deref() == Some("0") {
                return None;
            }
            let stat_id = StatId::new(shape::uint(&f, "stat_id")?);
            let display_name = shape::text(&f, "display_name")
                .or_else(|| shape::text(&f, "abbr"))
                .unwrap_or_else(|| stat_id.to_string());
            let sort_order = shape::text(&f, "sort_order").unwrap_or_else(|| "1".to_string());
            Some(StatCategory {
                stat_id,
                kind: StatKind::classify(&display_name, &sort_order),
                display_name,
                display_only: shape::flag(&f, "is_only_display_stat"),
            })
        })
        .collect();

    let roster_positions = sf
        .get("roster_positions")
        .map(|rp| shape::collection(rp, "roster_position"))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|slot| {
            let f = shape::fields(slot);
            Some(RosterSlotCount {
                position: Position::from(shape::text(&f, "position")?),
                count: shape::uint(&f, "count").unwrap_or(0),
            })
        })
        .collect();

    let start_week = week(&lf, "start_week").unwrap_or_default();
    let settings = LeagueSettings {
        name: shape::text(&lf, "name").unwrap_or_else(|| league_key.clone()),
        league_key,
        season: shape::uint(&lf, "season")
            .and_then(|s| u16::try_from(s).ok())
            .map(Season::new)
            .unwrap_or_default(),
        num_teams: required(shape::uint(&lf, "num_teams"), "num_teams")?,
        scoring_type,
        current_week: week(&lf, "current_week").unwrap_or(start_week),
        start_week,
        end_week: required(week(&lf, "end_week"), "end_week")?,
        playoff_start_week: week(&sf, "playoff_start_week"),
        is_finished: shape::flag(&lf, "is_finished"),
        stat_categories,
        roster_positions,
    };

    if !settings.is_head_to_head() {
        return Err(HoopsError::UnsupportedScoring {
            scoring_type: settings.scoring_type,
        });
    }
    Ok(settings)
}

/// Fetch and normalize the league's settings.
pub async fn fetch_league_settings<S: SessionProvider>(
    client: &mut EndpointClient<S>,
    ctx: &LeagueContext,
) -> Result<LeagueSettings> {
    let payload = client
        .fetch_with_reauth(&Resource::League(ctx.league_key()), None)
        .await?;
    normalize_league_settings(&payload)
}

/// Settings from the on-disk cache, when present, readable and for this league.
pub fn read_cached_league_settings(ctx: &LeagueContext, cache_path: &Path) -> Option<LeagueSettings> {
    let s = try_read_to_string(cache_path)?;
    match serde_json::from_str::<CachedLeagueSettings>(&s).map(|c| c.into_settings()) {
        Ok(Ok(settings)) if settings.league_key == ctx.league_key().as_str() => {
            debug!("Using cached settings from {}", cache_path.display());
            Some(settings)
        }
        Ok(Ok(_)) => {
            warn!("Cached settings belong to another league; ignoring");
            None
        }
        Ok(Err(e)) => {
            warn!("Ignoring cached settings: {}", e);
            None
        }
        Err(e) => {
            warn!("Ignoring unreadable settings cache: {}", e);
            None
        }
    }
}

/// Try the settings cache first. If missing, unreadable or `refresh == true`,
/// fetch from the API and re-write the cache.
pub async fn load_or_fetch_league_settings<S: SessionProvider>(
    client: &mut EndpointClient<S>,
    ctx: &LeagueContext,
    refresh: bool,
    cache_path: &Path,
) -> Result<LeagueSettings> {
    if !refresh {
        if let Some(settings) = read_cached_league_settings(ctx, cache_path) {
            return Ok(settings);
        }
    }

    let settings = fetch_league_settings(client, ctx).await?;
    info!(
        "Fetched settings for {} ({} teams, {} categories)",
        settings.name,
        settings.num_teams,
        settings.stat_categories.len()
    );

    match serde_json::to_string_pretty(&settings) {
        Ok(json) => {
            if let Err(e) = write_string(cache_path, &json) {
                warn!("Failed to write settings cache {}: {}", cache_path.display(), e);
            }
        }
        Err(e) => warn!("Failed to serialize settings for cache: {}", e),
    }

    Ok(settings)
}
