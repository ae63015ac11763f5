//! League data command implementation

use tracing::warn;

use crate::{
    core::{league_settings_path, SessionProvider},
    yahoo::{
        endpoints::{EndpointClient, Resource, MAX_PAGE_SIZE},
        normalize::normalize_teams,
        paginate::paginate,
        settings::load_or_fetch_league_settings,
        types::{LeagueSettings, Team},
    },
    LeagueContext, Result,
};

use super::{oauth_client, resolve_league_context, LeagueArgs};

/// Handle the league data command
pub async fn handle_league_data(league: LeagueArgs, refresh: bool, verbose: bool) -> Result<()> {
    let ctx = resolve_league_context(&league)?;
    let path = league_settings_path(&ctx.league_key());

    if refresh {
        println!("Fetching fresh league settings from Yahoo...");
    } else {
        println!("Loading league settings (cached if available)...");
    }

    let mut client = oauth_client(None)?;
    let settings = load_or_fetch_league_settings(&mut client, &ctx, refresh, &path).await?;

    println!("✓ League settings loaded successfully");
    print!("{}", describe_settings(&settings));

    let teams = fetch_teams(&mut client, &ctx, &settings).await?;
    print!("{}", describe_teams(&teams));

    if verbose {
        println!("League settings cached at: {}", path.display());
        println!("League key: {}, Season: {}", ctx.league_key(), ctx.season());
    }

    Ok(())
}

/// Every team in the league, fetched page by page.
pub async fn fetch_teams<S: SessionProvider>(
    client: &mut EndpointClient<S>,
    ctx: &LeagueContext,
    settings: &LeagueSettings,
) -> Result<Vec<Team>> {
    let mut teams = Vec::new();
    let mut cursor = paginate(client, Resource::Teams(ctx.league_key()), MAX_PAGE_SIZE)
        .with_expected_total(settings.num_teams as usize);
    while let Some(page) = cursor.next_page().await? {
        let normalized = normalize_teams(&page.payload);
        for d in &normalized.diagnostics {
            warn!("{}", d);
        }
        teams.extend(normalized.entities);
    }
    Ok(teams)
}

/// One line per team with its managers.
pub fn describe_teams(teams: &[Team]) -> String {
    let mut out = format!("Teams ({}):\n", teams.len());
    for team in teams {
        let managers = match team.managers.as_slice() {
            [] => "no manager listed".to_string(),
            names => names.join(", "),
        };
        out.push_str(&format!("  {:<28} {}\n", team.name, managers));
    }
    out
}

/// Human-readable summary of a league's settings.
pub fn describe_settings(settings: &LeagueSettings) -> String {
    let mut out = format!(
        "{} ({} teams, {} scoring)\nWeeks {}-{}, current week {}",
        settings.name,
        settings.num_teams,
        settings.scoring_type,
        settings.start_week,
        settings.end_week,
        settings.current_week
    );
    if let Some(playoffs) = settings.playoff_start_week {
        out.push_str(&format!(", playoffs from week {}", playoffs));
    }
    if settings.is_finished {
        out.push_str(" (finished)");
    }
    out.push('\n');

    let categories: Vec<String> = settings
        .stat_categories
        .iter()
        .map(|c| {
            if c.is_scoring() {
                c.display_name.clone()
            } else {
                format!("({})", c.display_name)
            }
        })
        .collect();
    out.push_str(&format!("Categories: {}\n", categories.join(" ")));

    let slots: Vec<String> = settings
        .roster_positions
        .iter()
        .map(|r| format!("{}x{}", r.position, r.count))
        .collect();
    out.push_str(&format!(
        "Roster: {} ({} active)\n",
        slots.join(" "),
        settings.players_per_team()
    ));
    out
}
