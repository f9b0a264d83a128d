//! Configuration module.
//!
//! Loads TOML configuration with sensible defaults: user agent, home URL,
//! download directory, cookie-store path, fan-out width, and credentials.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::api::DEFAULT_CONCURRENT_FETCHES;
use crate::auth::{CachedLogin, CredentialLogin, LoginStrategy};
use crate::error::{Error, Result};
use crate::session::HOME_URL;

/// Library configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User agent sent on every request.
    pub user_agent: String,

    /// Platform home URL; overridable mainly for tests.
    pub home_url: Url,

    /// Base directory for downloaded videos.
    pub download_directory: PathBuf,

    /// Where to persist the cookie jar; `None` disables cached login.
    pub cookie_store: Option<PathBuf>,

    /// Fan-out width for course fetches within a learning path.
    pub concurrent_fetches: usize,

    /// Platform credentials for the fallback login.
    pub credentials: Option<Credentials>,
}

/// Username/password pair.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            home_url: Url::parse(HOME_URL).expect("valid constant URL"),
            download_directory: PathBuf::from("downloads"),
            cookie_store: None,
            concurrent_fetches: DEFAULT_CONCURRENT_FETCHES,
            credentials: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("user_agent must not be empty".to_string()));
        }
        if self.concurrent_fetches == 0 {
            return Err(Error::Config(
                "concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if let Some(credentials) = &self.credentials {
            if credentials.username.trim().is_empty() {
                return Err(Error::Config(
                    "credentials.username must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Compose the login strategy described by this configuration:
    /// credential login, wrapped in cached login when a cookie-store path is
    /// configured.
    pub fn login_strategy(&self) -> Result<Box<dyn LoginStrategy>> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| Error::Config("no credentials configured".to_string()))?;

        let backup: Box<dyn LoginStrategy> = Box::new(CredentialLogin::new(
            credentials.username.as_str(),
            credentials.password.as_str(),
        ));

        Ok(match &self.cookie_store {
            Some(path) => Box::new(CachedLogin::new(path, backup)),
            None => backup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.concurrent_fetches, DEFAULT_CONCURRENT_FETCHES);
        assert_eq!(config.home_url.as_str(), HOME_URL);
    }

    #[test]
    fn load_merges_partial_toml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                download_directory = "/tmp/videos"
                concurrent_fetches = 2

                [credentials]
                username = "user@example.com"
                password = "hunter2"
            "#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.download_directory, PathBuf::from("/tmp/videos"));
        assert_eq!(config.concurrent_fetches, 2);
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(
            config.credentials.as_ref().unwrap().username,
            "user@example.com"
        );
    }

    #[test]
    fn zero_fan_out_is_rejected() {
        let config = Config {
            concurrent_fetches: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn login_strategy_requires_credentials() {
        let config = Config::default();
        assert!(matches!(config.login_strategy(), Err(Error::Config(_))));
    }

    #[test]
    fn login_strategy_wraps_in_cached_login_when_store_configured() {
        let config = Config {
            cookie_store: Some(PathBuf::from("cookies.json")),
            credentials: Some(Credentials {
                username: "user@example.com".to_string(),
                password: "hunter2".to_string(),
            }),
            ..Config::default()
        };
        // Composition succeeds; the concrete strategy is exercised in the
        // auth module's tests.
        config.login_strategy().unwrap();
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let credentials = Credentials {
            username: "user@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains("hunter2"));
    }
}
