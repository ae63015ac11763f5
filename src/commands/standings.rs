//! Standings command: report-layer views over the on-disk entity store.

use serde_json::json;

use crate::{
    cli::types::Week,
    core::{entity_db_path, league_settings_path},
    storage::{EntityStore, TeamRecord, WeeklyScore},
    yahoo::{settings::read_cached_league_settings, types::StatCategory},
    HoopsError, Result,
};

use super::{resolve_league_context, LeagueArgs};

/// Handle the standings command
///
/// Without a week, prints season records from stored matchups. With one,
/// prints that week's all-play category table.
pub async fn handle_standings(league: LeagueArgs, week: Option<Week>, as_json: bool) -> Result<()> {
    let ctx = resolve_league_context(&league)?;
    let league_key = ctx.league_key();
    let db_path = entity_db_path(&league_key);
    if !db_path.exists() {
        return Err(HoopsError::Cache {
            message: format!(
                "no entity store at {}; run `get extract` first",
                db_path.display()
            ),
        });
    }
    let store = EntityStore::open(&db_path)?;

    let Some(week) = week else {
        let records = store.team_records()?;
        if as_json {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            print!("{}", render_records(&records));
        }
        return Ok(());
    };

    let settings =
        read_cached_league_settings(&ctx, &league_settings_path(&league_key)).ok_or_else(|| {
            HoopsError::Cache {
                message: "league settings not cached; run `get league-data` first".to_string(),
            }
        })?;
    let rows = store.weekly_category_scores(week, &settings.stat_categories)?;

    if as_json {
        let out = json!({"week": week, "rows": rows});
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render_weekly(&rows, &settings.stat_categories));
    }
    Ok(())
}

/// Plain-text season table.
pub fn render_records(records: &[TeamRecord]) -> String {
    let mut out = format!("{:<4} {:<28} {:>9} {:>6}\n", "#", "Team", "W-L-T", "Pct");
    for (i, r) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<28} {:>9} {:>6.3}\n",
            i + 1,
            r.team.name,
            format!("{}-{}-{}", r.wins, r.losses, r.ties),
            r.win_pct()
        ));
    }
    out
}

/// Plain-text all-play table, one column per scoring category.
pub fn render_weekly(rows: &[WeeklyScore], categories: &[StatCategory]) -> String {
    let scoring: Vec<&StatCategory> = categories.iter().filter(|c| c.is_scoring()).collect();

    let mut out = format!("{:<28}", "Team");
    for c in &scoring {
        out.push_str(&format!(" {:>6}", c.display_name));
    }
    out.push_str(&format!(" {:>7} {:>7} {:>6}\n", "Total", "MW", "Result"));

    for row in rows {
        out.push_str(&format!("{:<28}", row.team_name));
        for c in &scoring {
            match row.category_points.get(&c.stat_id) {
                Some(points) => out.push_str(&format!(" {:>6.1}", points)),
                None => out.push_str(&format!(" {:>6}", "-")),
            }
        }
        out.push_str(&format!(" {:>7.1} {:>7.1}", row.total, row.matchup_wins));
        match row.week_result {
            Some(result) => out.push_str(&format!(" {:>6.1}\n", result)),
            None => out.push_str(&format!(" {:>6}\n", "-")),
        }
    }
    out
}
