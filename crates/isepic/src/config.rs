//! CLI configuration: a thin wrapper around the `isepic_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --username, --password, --verify-tls, ...).

use secrecy::SecretString;
use url::Url;

use isepic_api::{ClientConfig, Credentials, TlsMode};

use clap::ValueEnum;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use isepic_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

/// Everything a mapping command needs: where to connect and the
/// profile's default agent id.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub agent_id: Option<String>,
    pub output: OutputFormat,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the client configuration from the config file, the active
/// profile, and CLI overrides. Flags beat profile values.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    // A broken config file is reported, not silently replaced by defaults.
    let cfg = isepic_config::load_config()?;
    let profile_name = active_profile_name(global, &cfg);
    let output = output_format(global, &cfg.defaults)?;

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => Profile::default(),
    };

    // 1. Flag overrides (flag > env > profile)
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if profile.host.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    // 2. Credentials: an explicit password skips the lookup chain
    let credentials = match (&global.password, &profile.username) {
        (Some(password), Some(username)) => {
            Credentials::new(username.clone(), SecretString::from(password.clone()))
        }
        _ => isepic_config::resolve_credentials(&profile, &profile_name)?,
    };

    // 3. Client config, then base URL and TLS overrides
    let mut client =
        isepic_config::profile_to_client_config(&profile, credentials, &cfg.defaults)?;
    if let Some(ref raw) = global.base_url {
        client.base_url = Url::parse(raw).map_err(|e| CliError::Validation {
            field: "base-url".into(),
            reason: e.to_string(),
        })?;
    }
    client.transport.tls = resolve_tls(global, &profile, &cfg.defaults);

    Ok(Resolved {
        profile_name,
        client,
        agent_id: profile.agent_id,
        output,
    })
}

/// `--output` wins, then `defaults.output` from the config file.
pub fn output_format(
    global: &GlobalOpts,
    defaults: &Defaults,
) -> Result<OutputFormat, CliError> {
    if let Some(ref format) = global.output {
        return Ok(format.clone());
    }
    OutputFormat::from_str(&defaults.output, true).map_err(|_| CliError::Validation {
        field: "defaults.output".into(),
        reason: format!(
            "'{}' is not one of table, json, json-compact, yaml, plain",
            defaults.output
        ),
    })
}

/// `--insecure` forces verification off, `--verify-tls` forces it on
/// (honoring a profile CA), otherwise the profile decides.
pub fn resolve_tls(global: &GlobalOpts, profile: &Profile, defaults: &Defaults) -> TlsMode {
    if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else if global.verify_tls {
        profile
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa)
    } else {
        isepic_config::resolve_tls(profile, defaults)
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}
