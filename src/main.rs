//! Entry point: parse CLI and dispatch to command handlers.

use anyhow::Context;
use clap::Parser;
use fantasy_hoops::{
    cli::{Commands, GetCmd, Hoops},
    commands::{
        extract::{handle_extract, ExtractParams},
        league_data::handle_league_data,
        standings::handle_standings,
    },
    logging::initialize_logging,
};

/// Run the CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = Hoops::parse();
    let Commands::Get { cmd } = app.command;

    initialize_logging(cmd.league().verbose)?;
    let league = cmd.league().league_args();

    match cmd {
        GetCmd::LeagueData {
            league: opts,
            refresh,
        } => handle_league_data(league, refresh, opts.verbose)
            .await
            .context("league-data failed")?,

        GetCmd::Extract {
            through_week,
            page_size,
            max_attempts,
            json,
            ..
        } => handle_extract(ExtractParams {
            league,
            through_week,
            page_size,
            max_attempts,
            as_json: json,
        })
        .await
        .context("extract failed")?,

        GetCmd::Standings { week, json, .. } => handle_standings(league, week, json)
            .await
            .context("standings failed")?,
    }

    Ok(())
}
