//! HTTP utilities for Yahoo API communication

use crate::{HoopsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

pub const ACCESS_TOKEN_ENV_VAR: &str = "YAHOO_ACCESS_TOKEN";
pub const REFRESH_TOKEN_ENV_VAR: &str = "YAHOO_REFRESH_TOKEN";
pub const CLIENT_ID_ENV_VAR: &str = "YAHOO_CLIENT_ID";
pub const CLIENT_SECRET_ENV_VAR: &str = "YAHOO_CLIENT_SECRET";

/// OAuth2 credentials for the fantasy API.
///
/// Only the access token is required; without the refresh triple the session
/// simply reports `AuthExpired` once the token lapses.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl OAuthCredentials {
    /// Read credentials from `YAHOO_ACCESS_TOKEN` and the optional refresh variables.
    pub fn from_env() -> Result<Self> {
        let access_token =
            std::env::var(ACCESS_TOKEN_ENV_VAR).map_err(|_| HoopsError::MissingCredentials {
                env_var: ACCESS_TOKEN_ENV_VAR.to_string(),
            })?;
        Ok(Self {
            access_token,
            refresh_token: std::env::var(REFRESH_TOKEN_ENV_VAR).ok(),
            client_id: std::env::var(CLIENT_ID_ENV_VAR).ok(),
            client_secret: std::env::var(CLIENT_SECRET_ENV_VAR).ok(),
        })
    }

    /// Refresh token, client id and client secret, when all three are present.
    pub fn refresh_parts(&self) -> Option<(&str, &str, &str)> {
        match (&self.refresh_token, &self.client_id, &self.client_secret) {
            (Some(rt), Some(id), Some(secret)) => Some((rt, id, secret)),
            _ => None,
        }
    }
}

/// Build the JSON accept + bearer authorization headers for a request.
pub fn bearer_header_map(access_token: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(ACCEPT, HeaderValue::from_static("application/json"));
    h.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", access_token))?,
    );
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            ACCESS_TOKEN_ENV_VAR,
            REFRESH_TOKEN_ENV_VAR,
            CLIENT_ID_ENV_VAR,
            CLIENT_SECRET_ENV_VAR,
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_bearer_header_map() {
        let headers = bearer_header_map("abc123").unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_bearer_header_map_rejects_control_chars() {
        assert!(bearer_header_map("bad\ntoken").is_err());
    }

    #[test]
    #[serial]
    fn test_credentials_from_env_with_refresh() {
        clear_env();
        std::env::set_var(ACCESS_TOKEN_ENV_VAR, "access");
        std::env::set_var(REFRESH_TOKEN_ENV_VAR, "refresh");
        std::env::set_var(CLIENT_ID_ENV_VAR, "id");
        std::env::set_var(CLIENT_SECRET_ENV_VAR, "secret");

        let creds = OAuthCredentials::from_env().unwrap();
        assert_eq!(creds.access_token, "access");
        assert_eq!(creds.refresh_parts(), Some(("refresh", "id", "secret")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_credentials_from_env_partial_refresh() {
        clear_env();
        std::env::set_var(ACCESS_TOKEN_ENV_VAR, "access");
        std::env::set_var(REFRESH_TOKEN_ENV_VAR, "refresh");

        let creds = OAuthCredentials::from_env().unwrap();
        assert!(creds.refresh_parts().is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_credentials_from_env_missing_token() {
        clear_env();

        match OAuthCredentials::from_env().unwrap_err() {
            HoopsError::MissingCredentials { env_var } => {
                assert_eq!(env_var, ACCESS_TOKEN_ENV_VAR)
            }
            other => panic!("Expected MissingCredentials, got {:?}", other),
        }
    }
}
