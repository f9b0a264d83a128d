//! Login strategies and session validation.
//!
//! A [`LoginStrategy`] turns a fresh [`Session`] into a validated signed-in
//! one, or fails. Strategies are closed, explicit structs behind one trait:
//! [`CredentialLogin`] performs a full username/password login,
//! [`CachedLogin`] wraps a backup strategy with a persisted cookie jar.

pub mod cached;
pub mod credentials;
pub mod forms;

pub use cached::CachedLogin;
pub use credentials::CredentialLogin;

use async_trait::async_trait;

use crate::error::Result;
use crate::session::Session;

/// Marker present in the home page HTML only for anonymous visitors. The
/// closing slash is part of the marker: only the exact anchor text counts.
const SIGN_IN_MARKER: &str = ">Sign in</";

/// Cookie set once a login has succeeded.
pub(crate) const SIGNED_IN_COOKIE: &str = "liap";

/// A pluggable login strategy.
///
/// Contract: after `authenticate` returns Ok the session is validated
/// signed-in; on Err the caller must treat the session as unauthenticated.
#[async_trait]
pub trait LoginStrategy: Send + Sync {
    async fn authenticate(&self, session: &Session) -> Result<()>;
}

/// Probe sign-in state by requesting the home page and checking for the
/// absence of the anonymous "Sign in" marker.
pub async fn check_signed_in(session: &Session) -> Result<bool> {
    let response = session
        .client()
        .get(session.home_url().clone())
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;
    Ok(!body.contains(SIGN_IN_MARKER))
}
