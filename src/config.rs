//! Environment-driven configuration: database location and sync service.

use crate::{
    error::{ClubError, Result},
    DB_PATH_ENV_VAR, SERVICE_KEY_ENV_VAR, SERVICE_URL_ENV_VAR,
};
use std::path::PathBuf;

/// Connection details for the hosted backend that `sync push` writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without a trailing slash, e.g. `https://club.example.co`.
    pub url: String,
    /// Public (anon) API key sent with every request.
    pub api_key: String,
}

impl ServiceConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Read the service URL and key from the environment.
    pub fn from_env() -> Result<Self> {
        let url = non_empty_env(SERVICE_URL_ENV_VAR)?;
        let api_key = non_empty_env(SERVICE_KEY_ENV_VAR)?;
        Ok(Self::new(url, api_key))
    }
}

fn non_empty_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ClubError::MissingServiceConfig {
            env_var: name.to_string(),
        })
}

/// Default database location: `<data dir>/clubhouse/club.db`.
pub fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".local");
        home.push("share");
        home
    });
    base.join("clubhouse").join("club.db")
}

/// Resolve the database path from the `--db` flag, then the environment,
/// then the platform default.
pub fn resolve_db_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path
        .or_else(|| {
            std::env::var(DB_PATH_ENV_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(default_db_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests share process state; keep them in one test.
    #[test]
    fn test_env_resolution() {
        std::env::remove_var(DB_PATH_ENV_VAR);
        assert_eq!(resolve_db_path(None), default_db_path());

        std::env::set_var(DB_PATH_ENV_VAR, "/tmp/club-env.db");
        assert_eq!(resolve_db_path(None), PathBuf::from("/tmp/club-env.db"));
        assert_eq!(
            resolve_db_path(Some(PathBuf::from("/tmp/club-flag.db"))),
            PathBuf::from("/tmp/club-flag.db")
        );
        std::env::remove_var(DB_PATH_ENV_VAR);

        std::env::remove_var(SERVICE_URL_ENV_VAR);
        std::env::remove_var(SERVICE_KEY_ENV_VAR);
        match ServiceConfig::from_env() {
            Err(ClubError::MissingServiceConfig { env_var }) => {
                assert_eq!(env_var, SERVICE_URL_ENV_VAR)
            }
            other => panic!("Expected MissingServiceConfig, got {:?}", other),
        }

        std::env::set_var(SERVICE_URL_ENV_VAR, "https://club.example.co/");
        match ServiceConfig::from_env() {
            Err(ClubError::MissingServiceConfig { env_var }) => {
                assert_eq!(env_var, SERVICE_KEY_ENV_VAR)
            }
            other => panic!("Expected MissingServiceConfig, got {:?}", other),
        }

        std::env::set_var(SERVICE_KEY_ENV_VAR, "anon-key");
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.url, "https://club.example.co");
        assert_eq!(config.api_key, "anon-key");

        std::env::remove_var(SERVICE_URL_ENV_VAR);
        std::env::remove_var(SERVICE_KEY_ENV_VAR);
    }

    #[test]
    fn test_default_db_path_file_name() {
        let path = default_db_path();
        assert!(path.ends_with("clubhouse/club.db"));
    }
}
