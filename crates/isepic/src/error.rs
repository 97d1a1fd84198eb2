//! CLI error types with miette diagnostics.
//!
//! Maps `isepic_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use isepic_api::Error as ApiError;
use isepic_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach ISE-PIC at {url}")]
    #[diagnostic(
        code(isepic::connection_failed),
        help(
            "Check that the node is reachable on port 9094 and the Passive\n\
             Identity service is enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(isepic::tls_error),
        help("Check ca_cert in your profile, or drop --verify-tls for self-signed nodes.")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(isepic::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             Store a password with: isepic config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(isepic::no_credentials),
        help(
            "Configure credentials with: isepic config init\n\
             Or pass --username / set ISEPIC_USERNAME and ISEPIC_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("Identity mapping '{identifier}' not found")]
    #[diagnostic(code(isepic::not_found))]
    NotFound { identifier: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("ISE-PIC rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(isepic::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(isepic::unexpected_response))]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(isepic::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(isepic::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: isepic config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No ISE-PIC host configured")]
    #[diagnostic(
        code(isepic::no_config),
        help(
            "Create a profile with: isepic config init\n\
             Or pass --host / set ISEPIC_HOST.\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(isepic::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(isepic::timeout),
        help("Increase timeout with --timeout or check the node's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(isepic::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(isepic::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Translate an API error, naming the profile and target for context.
    pub fn from_api(err: ApiError, profile: &str, url: &str) -> Self {
        match err {
            ApiError::Authentication { message, .. } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            ApiError::NotAuthenticated => Self::AuthFailed {
                profile: profile.into(),
                message: "no access token".into(),
            },
            ApiError::Transport(e) => Self::ConnectionFailed {
                url: url.into(),
                source: Box::new(e),
            },
            ApiError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Tls(message) => Self::TlsError { message },
            ApiError::Client { status, message } | ApiError::Server { status, message } => {
                Self::ApiError { status, message }
            }
            ApiError::InvalidTimestamp { value } => Self::Validation {
                field: "timestamp".into(),
                reason: format!("'{value}' is not YYYY-MM-DDTHH:MM:SSZ"),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            ApiError::InvalidHeader(message) => Self::Validation {
                field: "header".into(),
                reason: message,
            },
            other @ (ApiError::UnexpectedStatus { .. } | ApiError::Deserialization { .. }) => {
                Self::UnexpectedResponse {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
            ConfigError::Serialization(e) => Self::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Keyring(e) => Self::Validation {
                field: "keyring".into(),
                reason: e.to_string(),
            },
        }
    }
}
