//! Authenticated HTTP session shared by login strategies and the fetcher.
//!
//! A [`Session`] bundles a reqwest [`Client`] with the persistent cookie store
//! it writes into. The store is the only mutable state shared across the
//! login/probe/fetch sequence: login strategies mutate it, everything else
//! only reads it (CSRF extraction, sign-in checks).

pub mod store;

use std::fmt;
use std::sync::{Arc, MutexGuard};

use cookie_store::CookieStore;
use reqwest::Client;
use reqwest_cookie_store::CookieStoreMutex;
use url::Url;

use crate::error::{Error, Result};

/// Platform home URL; all endpoints are resolved against it.
pub const HOME_URL: &str = "https://www.linkedin.com/";

/// Cookie the CSRF token is read from.
pub const CSRF_COOKIE: &str = "JSESSIONID";

/// HTTP session: client, cookie jar, and the home URL requests resolve
/// against. Cheap to clone; clones share the client and the jar.
#[derive(Clone)]
pub struct Session {
    client: Client,
    cookies: Arc<CookieStoreMutex>,
    home_url: Url,
}

impl Session {
    /// Create a session against the default platform home URL.
    pub fn new(user_agent: &str) -> Result<Self> {
        Self::with_home_url(user_agent, Url::parse(HOME_URL)?)
    }

    /// Create a session against a custom home URL (also used by tests to
    /// point the session at a mock server).
    pub fn with_home_url(user_agent: &str, home_url: Url) -> Result<Self> {
        let cookies = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_provider(Arc::clone(&cookies))
            .build()?;

        Ok(Self {
            client,
            cookies,
            home_url,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    /// Resolve a path-and-query string against the home URL.
    pub fn endpoint(&self, path_and_query: &str) -> Result<Url> {
        Ok(self.home_url.join(path_and_query)?)
    }

    /// Read the CSRF token from the session cookie.
    ///
    /// Fails if the cookie is absent, which means no login strategy has
    /// validated this session yet.
    pub fn csrf_token(&self) -> Result<String> {
        self.cookie_value(CSRF_COOKIE).ok_or_else(|| {
            Error::Session(format!(
                "no '{}' cookie in session; authenticate first",
                CSRF_COOKIE
            ))
        })
    }

    /// Look up a cookie value by name, with surrounding quotes stripped.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        self.jar()
            .iter_any()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().trim_matches('"').to_string())
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookie_value(name).is_some()
    }

    /// Drop every cookie in the jar.
    pub fn clear_cookies(&self) {
        self.jar().clear();
    }

    /// Replace the jar contents with a previously persisted store.
    pub fn replace_cookies(&self, store: CookieStore) {
        *self.jar() = store;
    }

    /// Run a closure against the jar under its lock, e.g. to persist it.
    pub fn with_cookies<T>(&self, f: impl FnOnce(&CookieStore) -> T) -> T {
        f(&self.jar())
    }

    fn jar(&self) -> MutexGuard<'_, CookieStore> {
        self.cookies.lock().expect("cookie store lock poisoned")
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("home_url", &self.home_url.as_str())
            .finish_non_exhaustive()
    }
}
