//! Endpoint client for the Yahoo Fantasy v2 API.
//!
//! Every request goes through the injected [`SessionHandle`]; this module never
//! touches credentials. Retries cover rate limiting, server errors and
//! transport timeouts only.

use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::cli::types::{LeagueKey, Period, TeamKey, Week};
use crate::core::session::{SessionHandle, SessionProvider};
use crate::{HoopsError, Result};


/// Base path for the Yahoo Fantasy Sports v2 API.
pub const FANTASY_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2";

/// Largest page the collection endpoints will serve.
pub const MAX_PAGE_SIZE: u32 = 25;

/// Decoded JSON body of one response, before normalization.
pub type RawPayload = Value;

/// The remote resources the pipeline knows how to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// League metadata with its settings block.
    League(LeagueKey),
    /// All teams in a league, with standings. Paginated.
    Teams(LeagueKey),
    /// Players in a league's player pool. Paginated.
    Players(LeagueKey),
    Roster { team: TeamKey, week: Week },
    /// The league scoreboard for one week.
    Matchups { league: LeagueKey, week: Week },
    Stats { team: TeamKey, period: Period },
}

impl Resource {
    pub fn is_paginated(&self) -> bool {
        matches!(self, Resource::Teams(_) | Resource::Players(_))
    }

    /// Plural and singular keys of the collection a paginated resource returns.
    pub fn collection_keys(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Resource::Teams(_) => Some(("teams", "team")),
            Resource::Players(_) => Some(("players", "player")),
            _ => None,
        }
    }

    /// Path below the API base, including matrix parameters.
    pub fn path(&self, page: Option<PageParams>) -> String {
        let paging = page
            .map(|p| format!(";start={};count={}", p.start, p.count))
            .unwrap_or_default();

        match self {
            Resource::League(league) => format!("league/{}/settings", league),
            Resource::Teams(league) => {
                format!("league/{}/teams{};out=standings", league, paging)
            }
            Resource::Players(league) => format!("league/{}/players{}", league, paging),
            Resource::Roster { team, week } => format!("team/{}/roster;week={}", team, week),
            Resource::Matchups { league, week } => {
                format!("league/{}/scoreboard;type=week;week={}", league, week)
            }
            Resource::Stats { team, period } => match period {
                Period::Week(w) => format!("team/{}/stats;type=week;week={}", team, w),
                Period::Date(d) => format!("team/{}/stats;type=date;date={}", team, d),
                Period::Season(s) => format!("team/{}/stats;type=season;season={}", team, s),
            },
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::League(league) => write!(f, "league {}", league),
            Resource::Teams(league) => write!(f, "teams of {}", league),
            Resource::Players(league) => write!(f, "players of {}", league),
            Resource::Roster { team, week } => write!(f, "roster of {} for week {}", team, week),
            Resource::Matchups { league, week } => {
                write!(f, "scoreboard of {} for week {}", league, week)
            }
            Resource::Stats { team, period } => write!(f, "stats of {} for {}", team, period),
        }
    }
}

/// Pagination cursor parameters for collection resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub start: u32,
    pub count: u32,
}

impl PageParams {
    /// `count` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(start: u32, count: u32) -> Self {
        Self {
            start,
            count: clamp_page_size(count),
        }
    }
}

pub fn clamp_page_size(count: u32) -> u32 {
    count.clamp(1, MAX_PAGE_SIZE)
}

/// Retry ceiling and backoff for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each later one.
    pub base_backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
        }
    }
}

impl FetchPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff.saturating_mul(factor)
    }
}

enum StatusClass {
    Success,
    Auth,
    Transient,
    Invalid,
}

fn classify(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        401 | 403 => StatusClass::Auth,
        429 | 500..=599 => StatusClass::Transient,
        _ => StatusClass::Invalid,
    }
}

/// Pull the API's own error description out of an error body when it has one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/description")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Issues requests for known resources through an injected session.
pub struct EndpointClient<S> {
    session: SessionHandle<S>,
    base_url: String,
    policy: FetchPolicy,
}

impl<S: SessionProvider> EndpointClient<S> {
    pub fn new(provider: S) -> Self {
        Self {
            session: SessionHandle::new(provider),
            base_url: FANTASY_BASE_URL.to_string(),
            policy: FetchPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    pub fn session(&self) -> &SessionHandle<S> {
        &self.session
    }

    pub fn url_for(&self, resource: &Resource, page: Option<PageParams>) -> String {
        format!("{}/{}", self.base_url, resource.path(page))
    }

    /// Fetch one resource, retrying transient failures.
    ///
    /// 401/403 surface as `AuthExpired` without any refresh; see
    /// [`fetch_with_reauth`](Self::fetch_with_reauth).
    #[instrument(skip(self, resource), fields(resource = %resource))]
    pub async fn fetch_resource(
        &self,
        resource: &Resource,
        page: Option<PageParams>,
    ) -> Result<RawPayload> {
        match (resource.is_paginated(), page.is_some()) {
            (true, false) => {
                return Err(HoopsError::InvalidRequest {
                    resource: resource.to_string(),
                    status: 0,
                    message: "paginated resource requires start/count".to_string(),
                })
            }
            (false, true) => {
                return Err(HoopsError::InvalidRequest {
                    resource: resource.to_string(),
                    status: 0,
                    message: "resource does not accept start/count".to_string(),
                })
            }
            _ => {}
        }

        let url = self.url_for(resource, page);
        let params = [("format".to_string(), "json".to_string())];
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_status = None;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            match self.session.request(Method::GET, &url, &params).await {
                Ok(res) => match classify(res.status) {
                    StatusClass::Success => return Ok(serde_json::from_str(&res.body)?),
                    StatusClass::Auth => {
                        warn!("{} returned {}; session expired", resource, res.status);
                        return Err(HoopsError::AuthExpired);
                    }
                    StatusClass::Invalid => {
                        return Err(HoopsError::InvalidRequest {
                            resource: resource.to_string(),
                            status: res.status,
                            message: error_message(&res.body),
                        })
                    }
                    StatusClass::Transient => last_status = Some(res.status),
                },
                Err(HoopsError::Http(e)) if e.is_timeout() || e.is_connect() => {
                    warn!("Request error for {}: {}", resource, e);
                }
                Err(e) => return Err(e),
            }

            if attempt >= max_attempts {
                return Err(HoopsError::TransientFetchFailure {
                    resource: resource.to_string(),
                    attempts: attempt,
                    last_status,
                });
            }

            let wait = self.policy.backoff_after(attempt);
            warn!(
                "Transient failure on {} (status {:?}). Retrying in {:?} (attempt {}/{})",
                resource,
                last_status,
                wait,
                attempt + 1,
                max_attempts
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// [`fetch_resource`](Self::fetch_resource) with one transparent
    /// re-authentication per run.
    pub async fn fetch_with_reauth(
        &mut self,
        resource: &Resource,
        page: Option<PageParams>,
    ) -> Result<RawPayload> {
        match self.fetch_resource(resource, page).await {
            Err(HoopsError::AuthExpired) => {
                info!("Re-authenticating after auth failure on {}", resource);
                self.session.reauthenticate().await?;
                self.fetch_resource(resource, page).await
            }
            other => other,
        }
    }
}
