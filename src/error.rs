//! Error types for the fantasy basketball extraction pipeline

use thiserror::Error;


pub type Result<T> = std::result::Result<T, HoopsError>;

#[derive(Error, Debug)]
pub enum HoopsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to parse numeric id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Session authorization expired and could not be renewed")]
    AuthExpired,

    #[error("Transient failure fetching {resource} after {attempts} attempts (last status: {last_status:?})")]
    TransientFetchFailure {
        resource: String,
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Invalid request for {resource} ({status}): {message}")]
    InvalidRequest {
        resource: String,
        status: u16,
        message: String,
    },

    #[error("Incomplete pagination of {resource}: expected {expected} items, received {received}")]
    IncompletePagination {
        resource: String,
        expected: usize,
        received: usize,
    },

    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    #[error("Dangling reference from {from} to missing {missing}")]
    DanglingReference { from: String, missing: String },

    #[error("League ID not provided and {env_var} environment variable not set")]
    MissingLeagueId { env_var: String },

    #[error("Game ID not provided and {env_var} environment variable not set")]
    MissingGameId { env_var: String },

    #[error("Missing credentials: {env_var} environment variable not set")]
    MissingCredentials { env_var: String },

    #[error("Malformed key: {key}")]
    InvalidKey { key: String },

    #[error("Unsupported scoring type: {scoring_type} (only head-to-head leagues are supported)")]
    UnsupportedScoring { scoring_type: String },

    #[error("Malformed league settings: {reason}")]
    MalformedSettings { reason: String },

    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl HoopsError {
    /// Whether this error ends the whole extraction run rather than one resource.
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(self, HoopsError::AuthExpired)
    }
}
