//! Cookie-jar-backed login strategy wrapping a backup strategy.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::auth::{check_signed_in, LoginStrategy};
use crate::error::Result;
use crate::session::{store, Session};

/// Login via a persisted cookie jar, falling back to a backup strategy when
/// the cached session is no longer signed in.
///
/// The jar is persisted back to the store before returning, success or not,
/// so even a failed attempt records whatever cookies were collected.
pub struct CachedLogin {
    path: PathBuf,
    backup: Box<dyn LoginStrategy>,
}

impl CachedLogin {
    pub fn new(path: impl Into<PathBuf>, backup: Box<dyn LoginStrategy>) -> Self {
        Self {
            path: path.into(),
            backup,
        }
    }

    async fn ensure_signed_in(&self, session: &Session) -> Result<()> {
        if check_signed_in(session).await? {
            tracing::info!("cached session is still signed in");
            return Ok(());
        }

        tracing::info!("cached session is not signed in, using the backup strategy");
        self.backup.authenticate(session).await
    }
}

#[async_trait]
impl LoginStrategy for CachedLogin {
    async fn authenticate(&self, session: &Session) -> Result<()> {
        session.clear_cookies();
        match store::load(&self.path)? {
            Some(jar) => session.replace_cookies(jar),
            None => tracing::warn!(
                "cookie store '{}' not found, starting with an empty jar",
                self.path.display()
            ),
        }

        let outcome = self.ensure_signed_in(session).await;
        let persisted = session.with_cookies(|jar| store::save(&self.path, jar));

        match (outcome, persisted) {
            (Ok(()), persisted) => persisted,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(persist_err)) => {
                tracing::warn!("failed to persist cookie store: {}", persist_err);
                Err(e)
            }
        }
    }
}

impl fmt::Debug for CachedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedLogin")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
