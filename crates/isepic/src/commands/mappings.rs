//! Token and identity-mapping command handlers.

use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;

use isepic_api::{IdentityClient, IdentityMapping, PatRange, parse_timestamp};

use crate::cli::{AddArgs, DeleteArgs, DeleteByAgentArgs, GlobalOpts};
use crate::config::{self, Resolved};
use crate::error::CliError;
use crate::output;

/// An authenticated client plus the context needed for error messages.
struct Session {
    client: IdentityClient,
    profile: String,
    url: String,
}

impl Session {
    async fn open(resolved: Resolved) -> Result<Self, CliError> {
        let url = resolved.client.base_url.to_string();
        let client = IdentityClient::connect(resolved.client)
            .await
            .map_err(|e| CliError::from_api(e, &resolved.profile_name, &url))?;
        Ok(Self {
            client,
            profile: resolved.profile_name,
            url,
        })
    }

    fn fail(&self, err: isepic_api::Error) -> CliError {
        CliError::from_api(err, &self.profile, &self.url)
    }
}

// ── token ───────────────────────────────────────────────────────────

pub async fn token(global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let url = resolved.client.base_url.to_string();
    let format = resolved.output.clone();
    let fail = |e: isepic_api::Error| CliError::from_api(e, &resolved.profile_name, &url);

    let creds = resolved.client.credentials.clone();
    let client = IdentityClient::new(resolved.client).map_err(fail)?;
    let token = client
        .generate_token(&creds.username, &creds.password)
        .await
        .map_err(fail)?;

    let secret = token.expose_secret();
    let out = output::render_value(&format, &json!({ "token": secret }), Some(secret))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── add ─────────────────────────────────────────────────────────────

pub async fn add(args: AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Validate input before touching the network.
    let timestamp = match args.timestamp {
        Some(ref raw) => parse_timestamp(raw).map_err(|_| CliError::Validation {
            field: "timestamp".into(),
            reason: format!("'{raw}' is not YYYY-MM-DDTHH:MM:SSZ"),
        })?,
        None => Utc::now(),
    };
    let pat_range = PatRange::from_parts(args.pat_start, args.pat_end, args.pat_range_start);

    let resolved = config::resolve(global)?;
    let agent_info = args
        .agent_info
        .or_else(|| resolved.agent_id.clone())
        .ok_or_else(|| CliError::Validation {
            field: "agent-info".into(),
            reason: "pass --agent-info or set agent_id in the profile".into(),
        })?;

    let format = resolved.output.clone();
    let session = Session::open(resolved).await?;

    let mapping = IdentityMapping::new(args.user, args.src_ip, agent_info, timestamp, args.domain)
        .with_pat_range(pat_range);

    let record = session
        .client
        .add_identity_mapping(&mapping)
        .await
        .map_err(|e| session.fail(e))?;

    let id = record.id();
    tracing::info!(id = ?id, "identity mapping created");
    let out = output::render_value(&format, record.as_json(), id.as_deref())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── delete ──────────────────────────────────────────────────────────

pub async fn delete(args: DeleteArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let format = resolved.output.clone();
    let session = Session::open(resolved).await?;

    let result = session
        .client
        .delete_identity_mapping_by_id(&args.id)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                CliError::NotFound {
                    identifier: args.id.clone(),
                }
            } else {
                session.fail(e)
            }
        })?;

    let out = output::render_value(&format, &result, Some(&args.id))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── delete-by-agent ─────────────────────────────────────────────────

pub async fn delete_by_agent(args: DeleteByAgentArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let agent_id = args
        .agent_id
        .or_else(|| resolved.agent_id.clone())
        .ok_or_else(|| CliError::Validation {
            field: "agent-id".into(),
            reason: "pass an agent id or set agent_id in the profile".into(),
        })?;

    let format = resolved.output.clone();
    let session = Session::open(resolved).await?;

    let result = session
        .client
        .delete_all_identity_mappings_by_agent_id(&agent_id)
        .await
        .map_err(|e| session.fail(e))?;

    let out = output::render_value(&format, &result, Some(&agent_id))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
