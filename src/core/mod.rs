//! Core utilities for the extraction pipeline
//!
//! This module consolidates common utilities that are used across
//! the application:
//! - `cache`: File system cache locations and helpers
//! - `http`: Credential and header helpers
//! - `session`: The authenticated session capability

pub mod cache;
pub mod http;
pub mod session;

// Re-export commonly used items for convenience
pub use cache::{entity_db_path, league_settings_path, try_read_to_string, write_string};
pub use http::OAuthCredentials;
pub use session::{OAuthSession, RawResponse, SessionHandle, SessionProvider};
