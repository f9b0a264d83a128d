//! Username/password login strategy.

use std::fmt;

use async_trait::async_trait;

use crate::auth::{forms, LoginStrategy, SIGNED_IN_COOKIE};
use crate::error::{Error, Result};
use crate::session::Session;

/// Full credential login: scrape the login form, merge in the credentials,
/// submit, and verify the signed-in marker cookie.
#[derive(Clone)]
pub struct CredentialLogin {
    username: String,
    password: String,
}

impl CredentialLogin {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl LoginStrategy for CredentialLogin {
    async fn authenticate(&self, session: &Session) -> Result<()> {
        let login_url = session.endpoint("login/")?;
        tracing::debug!("GET {}", login_url);
        let body = session
            .client()
            .get(login_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut form = forms::login_form_fields(&body)?;
        form.insert("session_key".to_string(), self.username.clone());
        form.insert("session_password".to_string(), self.password.clone());

        let submit_url = session.endpoint("checkpoint/lg/login-submit")?;
        tracing::debug!("POST {}", submit_url);
        session
            .client()
            .post(submit_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        // Success is judged by the cookie jar, not the response body.
        if !session.has_cookie(SIGNED_IN_COOKIE) {
            return Err(Error::Authentication(format!(
                "login strategy failed: '{}' cookie not set",
                SIGNED_IN_COOKIE
            )));
        }

        tracing::info!("credential login succeeded for '{}'", self.username);
        Ok(())
    }
}

impl fmt::Debug for CredentialLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialLogin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
