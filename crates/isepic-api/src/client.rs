// ISE-PIC HTTP client
//
// Owns the service address, credentials and the two reqwest clients: the
// bootstrap client used for the token request and the session client that
// carries the token header. Endpoint operations live in `auth.rs` and
// `identity.rs` as inherent methods.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::{AuthState, Credentials};
use crate::error::Error;
use crate::transport::{TlsMode, TransportConfig};

/// Port the Passive Identity REST service listens on.
pub const DEFAULT_PORT: u16 = 9094;

/// Everything needed to talk to one ISE-PIC node.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Target `https://{host}:9094` without certificate verification.
    pub fn new(host: &str, credentials: Credentials) -> Result<Self, Error> {
        Ok(Self {
            base_url: service_url(host, DEFAULT_PORT)?,
            credentials,
            transport: TransportConfig::default(),
        })
    }

    /// Point the client somewhere other than the default service URL.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Verify the service certificate on mapping requests.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.transport.tls = TlsMode::from_verify(verify);
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }
}

/// Build `https://{host}:{port}/`, bracketing bare IPv6 literals.
pub fn service_url(host: &str, port: u16) -> Result<Url, Error> {
    let host = host.trim();
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]")
    } else {
        host.to_owned()
    };
    Ok(Url::parse(&format!("https://{host}:{port}/"))?)
}

/// `Url::join` drops the last segment unless the path ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Token-bearing session, present once the client is authenticated.
struct Session {
    token: SecretString,
    http: reqwest::Client,
}

/// Async client for the ISE-PIC Passive Identity API.
///
/// Created unauthenticated by [`new`](Self::new), or authenticated in one
/// step by [`connect`](Self::connect). Mapping operations refuse to run
/// until a token is held.
pub struct IdentityClient {
    base_url: Url,
    credentials: Credentials,
    transport: TransportConfig,
    bootstrap: reqwest::Client,
    session: Option<Session>,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.credentials.username)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build an unauthenticated client. No request is made.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let bootstrap = config.transport.bootstrap().build_client()?;
        Ok(Self {
            base_url: with_trailing_slash(config.base_url),
            credentials: config.credentials,
            transport: config.transport,
            bootstrap,
            session: None,
        })
    }

    /// Build a client and authenticate immediately.
    ///
    /// Fails with the authentication error instead of handing back a client
    /// that cannot make a single successful call.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let mut client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn state(&self) -> AuthState {
        if self.session.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// The access token, if one is held.
    pub fn token(&self) -> Option<&SecretString> {
        self.session.as_ref().map(|s| &s.token)
    }

    pub(crate) fn bootstrap_http(&self) -> &reqwest::Client {
        &self.bootstrap
    }

    /// The token-bearing session client.
    pub(crate) fn session_http(&self) -> Result<&reqwest::Client, Error> {
        self.session
            .as_ref()
            .map(|s| &s.http)
            .ok_or(Error::NotAuthenticated)
    }

    // ── State transitions ────────────────────────────────────────────

    /// Build the session client with the token preset as a default header.
    pub(crate) fn install_token(&mut self, token: SecretString) -> Result<(), Error> {
        let mut value = HeaderValue::from_str(token.expose_secret())
            .map_err(|e| Error::InvalidHeader(format!("access token: {e}")))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-auth-access-token"), value);

        let http = self.transport.build_client_with_headers(headers)?;
        self.session = Some(Session { token, http });
        Ok(())
    }

    pub(crate) fn clear_token(&mut self) {
        if self.session.take().is_some() {
            debug!("dropping previous session");
        }
    }

    // ── URL + response helpers ───────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.transport.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Accept exactly `expected` and parse the body, or classify the failure.
    ///
    /// An empty success body becomes `Value::Null`.
    pub(crate) async fn expect_json(
        &self,
        resp: reqwest::Response,
        expected: StatusCode,
    ) -> Result<Value, Error> {
        let status = resp.status();
        if status != expected {
            warn!(%status, %expected, "unexpected response status");
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::from_status(status, expected, &body));
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(body = %body, "response body");
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}
