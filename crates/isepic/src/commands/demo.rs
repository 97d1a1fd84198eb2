//! `isepic demo`: the add → delete → delete-by-agent walkthrough.
//!
//! Every step reports success or failure on its own line and the command
//! exits 0 whatever the individual outcomes were.

use std::time::Duration;

use chrono::Utc;
use owo_colors::OwoColorize;
use secrecy::SecretString;
use url::Url;

use isepic_api::{ClientConfig, Credentials, IdentityClient, IdentityMapping};

use crate::cli::{DemoArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

const EXAMPLE_USER: &str = "example_user";
const EXAMPLE_SRC_IP: &str = "Endpoint IP";
const EXAMPLE_DOMAIN: &str = "example.com";

/// Step reporter: one line per outcome, optionally colored.
struct Reporter {
    color: bool,
    quiet: bool,
}

impl Reporter {
    fn ok(&self, line: &str) {
        let line = if self.color {
            format!("{} {line}", "✓".green())
        } else {
            line.to_owned()
        };
        output::print_output(&line, self.quiet);
    }

    fn fail(&self, line: &str, err: &dyn std::fmt::Display) {
        let line = if self.color {
            format!("{} {line} ({})", "✗".red(), err.dimmed())
        } else {
            format!("{line} ({err})")
        };
        output::print_output(&line, self.quiet);
    }
}

pub async fn handle(args: DemoArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let credentials = Credentials::new(args.username, SecretString::from(args.password));
    let mut config = ClientConfig::new(&args.host, credentials).map_err(|e| CliError::Validation {
        field: "host".into(),
        reason: e.to_string(),
    })?;
    if let Some(ref raw) = global.base_url {
        let url = Url::parse(raw).map_err(|e| CliError::Validation {
            field: "base-url".into(),
            reason: e.to_string(),
        })?;
        config = config.with_base_url(url);
    }
    let config = config
        .with_verify(global.verify_tls && !global.insecure)
        .with_timeout(Duration::from_secs(global.timeout.unwrap_or(30)));

    let report = Reporter {
        color: output::should_color(&global.color),
        quiet: global.quiet,
    };

    let client = match IdentityClient::connect(config).await {
        Ok(client) => {
            report.ok(&format!("Authenticated with {}", args.host));
            client
        }
        Err(e) => {
            report.fail("Failed to authenticate", &e);
            return Ok(());
        }
    };

    // Add user
    let mapping = IdentityMapping::new(
        EXAMPLE_USER,
        EXAMPLE_SRC_IP,
        args.agent_id.as_str(),
        Utc::now(),
        EXAMPLE_DOMAIN,
    );
    let mapping_id = match client.add_identity_mapping(&mapping).await {
        Ok(record) => {
            report.ok(&format!("User added successfully: {}", record.as_json()));
            record.id()
        }
        Err(e) => {
            report.fail("Failed to add user", &e);
            None
        }
    };

    // Remove user by the id from the add response
    match mapping_id {
        Some(id) => match client.delete_identity_mapping_by_id(&id).await {
            Ok(removed) => report.ok(&format!("User removed successfully: {removed}")),
            Err(e) => report.fail("Failed to remove user", &e),
        },
        None => report.fail("Failed to remove user", &"no mapping id to delete"),
    }

    // Delete all identity mappings by agent id
    match client
        .delete_all_identity_mappings_by_agent_id(&args.agent_id)
        .await
    {
        Ok(_) => report.ok(&format!(
            "All identity mappings deleted for agent ID: {}",
            args.agent_id
        )),
        Err(e) => report.fail(
            &format!(
                "Failed to delete identity mappings for agent ID: {}",
                args.agent_id
            ),
            &e,
        ),
    }

    Ok(())
}
