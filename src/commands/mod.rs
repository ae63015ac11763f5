//! Command implementations for the fantasy-hoops CLI

pub mod extract;
pub mod league_data;
pub mod standings;

use crate::{
    core::OAuthSession,
    yahoo::{EndpointClient, FetchPolicy},
    GameId, HoopsError, LeagueContext, LeagueId, Result, Season, GAME_ID_ENV_VAR,
    LEAGUE_ID_ENV_VAR,
};


/// League selection flags shared by every command.
#[derive(Debug, Clone)]
pub struct LeagueArgs {
    pub league_id: Option<LeagueId>,
    pub game_id: Option<GameId>,
    pub game_code: String,
    pub season: Season,
}

/// Resolve league ID from CLI argument or environment variable.
pub fn resolve_league_id(league_id: Option<LeagueId>) -> Result<LeagueId> {
    league_id
        .or_else(|| {
            std::env::var(LEAGUE_ID_ENV_VAR)
                .ok()
                .and_then(|s| s.trim().parse::<LeagueId>().ok())
        })
        .ok_or_else(|| HoopsError::MissingLeagueId {
            env_var: LEAGUE_ID_ENV_VAR.to_string(),
        })
}

/// Resolve game ID from CLI argument or environment variable.
pub fn resolve_game_id(game_id: Option<GameId>) -> Result<GameId> {
    game_id
        .or_else(|| {
            std::env::var(GAME_ID_ENV_VAR)
                .ok()
                .and_then(|s| s.trim().parse::<GameId>().ok())
        })
        .ok_or_else(|| HoopsError::MissingGameId {
            env_var: GAME_ID_ENV_VAR.to_string(),
        })
}

/// Build the immutable context for a run.
pub fn resolve_league_context(args: &LeagueArgs) -> Result<LeagueContext> {
    Ok(LeagueContext::new(
        resolve_game_id(args.game_id)?,
        args.game_code.clone(),
        args.season,
        resolve_league_id(args.league_id)?,
    ))
}

/// Endpoint client over the OAuth session configured in the environment.
pub fn oauth_client(max_attempts: Option<u32>) -> Result<EndpointClient<OAuthSession>> {
    let client = EndpointClient::new(OAuthSession::from_env()?);
    Ok(match max_attempts {
        Some(n) => client.with_policy(FetchPolicy::default().with_max_attempts(n)),
        None => client,
    })
}
