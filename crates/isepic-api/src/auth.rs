// Token acquisition
//
// ISE-PIC hands out an access token from a Basic-auth POST. The token comes
// back in a response header on a 204, and every later call carries it in the
// same header.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::client::IdentityClient;
use crate::error::Error;

/// Header carrying the access token, both in the token response and on
/// every authenticated request.
pub const TOKEN_HEADER: &str = "X-auth-access-token";

/// Token generation endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "api/fmi_platform/v1/identityauth/generatetoken";

/// Username/password pair used for the token request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Whether a client currently holds an access token.
///
/// Marker enum (no data) -- the token itself stays inside the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No token yet, or the last login attempt failed.
    Unauthenticated,
    /// A token was issued and is attached to every mapping request.
    Authenticated,
}

impl IdentityClient {
    /// Request an access token for `username` / `password`.
    ///
    /// Does not change the client's state; [`login`](Self::login) does.
    /// The call is made without certificate verification regardless of the
    /// configured TLS mode. Success is exactly HTTP 204 with the token in
    /// the [`TOKEN_HEADER`] response header.
    pub async fn generate_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let url = self.url(TOKEN_PATH)?;
        debug!("POST {url} (token request for '{username}')");

        let resp = self
            .bootstrap_http()
            .post(url)
            .basic_auth(username, Some(password.expose_secret()))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            let body = resp.text().await.unwrap_or_default();
            return Err(if status.is_client_error() {
                Error::Authentication {
                    message: format!("token request rejected (HTTP {status})"),
                    status: Some(status.as_u16()),
                }
            } else {
                Error::from_status(status, StatusCode::NO_CONTENT, &body)
            });
        }

        let token = resp
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Authentication {
                message: format!("token response did not carry a {TOKEN_HEADER} header"),
                status: Some(status.as_u16()),
            })?;

        debug!("token issued");
        Ok(SecretString::from(token.to_owned()))
    }

    /// Obtain a token with the configured credentials and switch the client
    /// to [`AuthState::Authenticated`].
    ///
    /// On failure the client stays (or becomes) unauthenticated.
    pub async fn login(&mut self) -> Result<(), Error> {
        let credentials = self.credentials().clone();
        match self
            .generate_token(&credentials.username, &credentials.password)
            .await
        {
            Ok(token) => {
                self.install_token(token)?;
                info!(username = %credentials.username, "authenticated with ISE-PIC");
                Ok(())
            }
            Err(e) => {
                self.clear_token();
                Err(e)
            }
        }
    }
}
