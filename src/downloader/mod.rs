//! Orchestrator composing session, login strategy, fetcher, and parser.
//!
//! A [`Downloader`] owns one session lifecycle:
//! `start` (open session) → `login` → `fetch_course` / `fetch_course_path`
//! → `close`. Whoever opens the session is responsible for closing it;
//! `Drop` closes as a backstop so every exit path releases the session.

use crate::api::Fetcher;
use crate::auth::LoginStrategy;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::TreeParser;
use crate::session::Session;
use crate::tree::ContentTree;

/// Lifecycle states of a downloader run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloaderState {
    Idle,
    SessionOpen,
    Authenticated,
    Closed,
}

/// Orchestrates one download run.
pub struct Downloader {
    config: Config,
    strategy: Box<dyn LoginStrategy>,
    state: DownloaderState,
    session: Option<Session>,
    fetcher: Option<Fetcher>,
    parser: Option<TreeParser>,
}

impl Downloader {
    /// Create a downloader with default configuration.
    pub fn new(strategy: Box<dyn LoginStrategy>) -> Self {
        Self::with_config(strategy, Config::default())
    }

    pub fn with_config(strategy: Box<dyn LoginStrategy>, config: Config) -> Self {
        Self {
            config,
            strategy,
            state: DownloaderState::Idle,
            session: None,
            fetcher: None,
            parser: None,
        }
    }

    pub fn state(&self) -> DownloaderState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open the session: build the HTTP client, fetcher, and parser.
    pub fn start(&mut self) -> Result<()> {
        if self.state != DownloaderState::Idle {
            return Err(Error::Session("session already open".to_string()));
        }

        let session =
            Session::with_home_url(&self.config.user_agent, self.config.home_url.clone())?;
        let fetcher = Fetcher::with_concurrency(session.clone(), self.config.concurrent_fetches);
        self.parser = Some(TreeParser::new(fetcher.clone()));
        self.fetcher = Some(fetcher);
        self.session = Some(session);
        self.state = DownloaderState::SessionOpen;
        Ok(())
    }

    /// Drive the login strategy against the open session.
    pub async fn login(&mut self) -> Result<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::Session("no session".to_string()))?;
        self.strategy.authenticate(session).await?;
        self.state = DownloaderState::Authenticated;
        Ok(())
    }

    /// Fetch a single course and build its tree.
    pub async fn fetch_course(&self, slug: &str) -> Result<ContentTree> {
        let (fetcher, parser) = self.authenticated()?;
        let data = fetcher.fetch_course_data(slug).await?;
        parser.course(data)
    }

    /// Fetch a learning path with all its courses and build the tree.
    pub async fn fetch_course_path(&self, slug: &str) -> Result<ContentTree> {
        let (fetcher, parser) = self.authenticated()?;
        let (data, courses) = fetcher.fetch_course_path_data(slug).await?;
        parser.course_path(data, courses)
    }

    /// Close the session. Idempotent; valid in any state.
    pub fn close(&mut self) {
        self.session = None;
        self.fetcher = None;
        self.parser = None;
        if self.state != DownloaderState::Idle {
            self.state = DownloaderState::Closed;
        }
    }

    fn authenticated(&self) -> Result<(&Fetcher, &TreeParser)> {
        if self.state != DownloaderState::Authenticated {
            return Err(Error::Session("not authenticated".to_string()));
        }
        match (&self.fetcher, &self.parser) {
            (Some(fetcher), Some(parser)) => Ok((fetcher, parser)),
            _ => Err(Error::Session("no session".to_string())),
        }
    }
}

impl Drop for Downloader {
    fn drop(&mut self) {
        self.close();
    }
}
