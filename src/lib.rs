//! Yahoo Fantasy Basketball extraction library
//!
//! Pulls a head-to-head league's teams, rosters, weekly stats and matchups from
//! the Yahoo Fantasy Sports v2 API, normalizes the heterogeneous payloads into
//! flat entities, and stores them in a keyed SQLite entity store for reporting.
//!
//! ## Pipeline
//!
//! - **Endpoint Client** ([`yahoo::endpoints`]): one request per resource through
//!   an injected session, with retries for rate limits and server errors
//! - **Pagination Engine** ([`yahoo::paginate`]): offset cursors over collections,
//!   checked against the reported total
//! - **Response Normalizer** ([`yahoo::normalize`]): shape-independent entities
//!   plus per-record diagnostics
//! - **Entity Store** ([`storage`]): idempotent upserts and reference-checked views
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fantasy_hoops::{
//!     commands::extract::{weeks_to_extract, Extractor},
//!     core::OAuthSession,
//!     yahoo::{settings::fetch_league_settings, EndpointClient},
//!     EntityStore, GameId, LeagueContext, LeagueId, Season,
//! };
//!
//! # async fn example() -> fantasy_hoops::Result<()> {
//! let ctx = LeagueContext::new(GameId::new(428), "nba", Season::new(2023), LeagueId::new(107914));
//! let mut client = EndpointClient::new(OAuthSession::from_env()?);
//! let settings = fetch_league_settings(&mut client, &ctx).await?;
//! let weeks = weeks_to_extract(&settings);
//!
//! let mut extractor = Extractor::new(client, EntityStore::new_in_memory()?, ctx, settings);
//! let manifest = extractor.run(&weeks).await?;
//! println!("complete: {}", manifest.complete);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export YAHOO_ACCESS_TOKEN=...
//! export YAHOO_LEAGUE_ID=107914
//! export YAHOO_GAME_ID=428
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod logging;
pub mod storage;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use cli::types::{
    GameId, LeagueContext, LeagueId, LeagueKey, Period, PlayerKey, Position, Season, StatId,
    TeamKey, Week,
};
pub use error::{HoopsError, Result};
pub use storage::EntityStore;
pub use yahoo::types::{Entity, EntityKind, LeagueSettings};

pub const LEAGUE_ID_ENV_VAR: &str = "YAHOO_LEAGUE_ID";
pub const GAME_ID_ENV_VAR: &str = "YAHOO_GAME_ID";
