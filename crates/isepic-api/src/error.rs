use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error type for the `isepic-api` crate.
///
/// Every failure of a Passive Identity call lands in one of these variants.
/// Callers that only care about success can collapse a result with
/// [`Result::ok`]; callers that want detail match on the category.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token request rejected, or the token was refused by a later call.
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
    },

    /// A mapping operation was attempted before a token was obtained.
    #[error("Client is not authenticated -- call login() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, TLS, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS configuration or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// The service answered with a 4xx status.
    #[error("Request rejected (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// The service answered with a 5xx status.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// The service answered with a non-error status other than the one
    /// the endpoint signals success with.
    #[error("Unexpected HTTP status {status} (expected {expected})")]
    UnexpectedStatus { expected: u16, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Timestamp not in `YYYY-MM-DDTHH:MM:SSZ` form.
    #[error("Invalid timestamp '{value}': expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidTimestamp { value: String },

    /// A credential or token could not be encoded as a header value.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl Error {
    /// Classify a non-success HTTP response into the matching variant.
    pub(crate) fn from_status(status: StatusCode, expected: StatusCode, body: &str) -> Self {
        let message = if body.is_empty() {
            status.canonical_reason().unwrap_or("no body").to_owned()
        } else {
            body.chars().take(200).collect()
        };

        if status == StatusCode::UNAUTHORIZED {
            Self::Authentication {
                message,
                status: Some(status.as_u16()),
            }
        } else if status.is_client_error() {
            Self::Client {
                status: status.as_u16(),
                message,
            }
        } else if status.is_server_error() {
            Self::Server {
                status: status.as_u16(),
                message,
            }
        } else {
            Self::UnexpectedStatus {
                expected: expected.as_u16(),
                status: status.as_u16(),
            }
        }
    }

    /// Returns `true` if the failure is an authentication problem.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotAuthenticated)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::Server { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Client { status: 404, .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Client { status, .. }
            | Self::Server { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
