//! Type-safe wrappers and enums for Yahoo fantasy basketball data.

pub mod context;
pub mod ids;
pub mod position;
pub mod time;

pub use context::LeagueContext;
pub use ids::{GameId, LeagueId, LeagueKey, PlayerKey, StatId, TeamKey};
pub use position::Position;
pub use time::{Period, Season, Week};
