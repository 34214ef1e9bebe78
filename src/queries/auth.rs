//! Session user lookup and logout.

use log::{info, warn};
use reqwest::Method;

use crate::client::ApiClient;
use crate::config;
use crate::error::{CalenderError, Result};
use crate::models::User;

/// Query interface for the authenticated session.
pub struct AuthQuery<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthQuery<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// The user behind the current session, or `None` when signed out.
    ///
    /// A 401/403 or an empty/`null` body means no session; transport and
    /// decoding failures are still errors.
    pub fn current_user(&self) -> Result<Option<User>> {
        match self.client.get_optional_json::<User>(config::AUTH_USER_PATH) {
            Ok(user) => Ok(user),
            Err(CalenderError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// URL the UI should open to start the Google login flow.
    pub fn login_url(&self) -> String {
        self.client.url(config::AUTH_LOGIN_PATH)
    }

    /// End the session on the server and forget the local cookie.
    ///
    /// The local cookie is dropped even if the server call fails.
    pub fn logout(&self) -> Result<()> {
        let result = self.client.send_empty(Method::GET, config::AUTH_LOGOUT_PATH);
        if let Err(e) = &result {
            warn!("Logout request failed: {}", e);
        }
        self.client.clear_session()?;
        info!("Session cleared");
        result
    }
}
