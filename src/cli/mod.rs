//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use types::{GameId, LeagueId, Season, Week};

use crate::commands::LeagueArgs;
use crate::yahoo::endpoints::MAX_PAGE_SIZE;

/// League selection flags shared between commands
#[derive(Debug, Args)]
pub struct LeagueOpts {
    /// League ID (or set `YAHOO_LEAGUE_ID` env var).
    #[clap(long, short)]
    pub league_id: Option<LeagueId>,

    /// Yahoo game ID for the season, e.g. 428 for NBA 2023 (or set `YAHOO_GAME_ID`).
    #[clap(long, short)]
    pub game_id: Option<GameId>,

    /// Yahoo game code.
    #[clap(long, default_value = "nba")]
    pub game_code: String,

    /// Season year (e.g. 2024).
    #[clap(long, short, default_value_t = Season::default())]
    pub season: Season,

    /// Log request-level detail to stderr.
    #[clap(long, short)]
    pub verbose: bool,
}

impl LeagueOpts {
    pub fn league_args(&self) -> LeagueArgs {
        LeagueArgs {
            league_id: self.league_id,
            game_id: self.game_id,
            game_code: self.game_code.clone(),
            season: self.season,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum GetCmd {
    /// Fetch and optionally refresh cached league settings
    LeagueData {
        #[clap(flatten)]
        league: LeagueOpts,

        /// Force refresh from Yahoo, overwriting the cache.
        #[clap(long)]
        refresh: bool,
    },

    /// Extract teams, rosters, weekly stats and matchups into the local store.
    ///
    /// Covers every week from the season start through the current week.
    Extract {
        #[clap(flatten)]
        league: LeagueOpts,

        /// Stop after this week.
        #[clap(long)]
        through_week: Option<Week>,

        /// Items per page for collection requests (1-25).
        #[clap(long, default_value_t = MAX_PAGE_SIZE)]
        page_size: u32,

        /// Attempts per request before a transient failure is final.
        #[clap(long)]
        max_attempts: Option<u32>,

        /// Print the run manifest as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Season records from stored matchups, or one week's all-play table.
    Standings {
        #[clap(flatten)]
        league: LeagueOpts,

        /// Show the all-play category table for this week.
        #[clap(long, short)]
        week: Option<Week>,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },
}

impl GetCmd {
    pub fn league(&self) -> &LeagueOpts {
        match self {
            GetCmd::LeagueData { league, .. }
            | GetCmd::Extract { league, .. }
            | GetCmd::Standings { league, .. } => league,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(name = "fantasy-hoops", about = "Yahoo fantasy basketball league extractor")]
pub struct Hoops {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Get data from Yahoo Fantasy Basketball
    Get {
        #[clap(subcommand)]
        cmd: GetCmd,
    },
}
