//! Clap derive structures for the `isepic` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// isepic -- manage Cisco ISE-PIC passive identity mappings
#[derive(Debug, Parser)]
#[command(
    name = "isepic",
    version,
    about = "Manage Cisco ISE-PIC passive identity mappings from the command line",
    long_about = "Publish and retract user-to-IP identity mappings on a Cisco ISE-PIC\n\
        node through its Passive Identity REST API (port 9094).\n\n\
        Authenticates with username/password to obtain an access token,\n\
        then sends one request per command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// ISE-PIC profile to use
    #[arg(long, short = 'p', env = "ISEPIC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// ISE-PIC host or IP address (overrides profile)
    #[arg(long, short = 'H', env = "ISEPIC_HOST", global = true)]
    pub host: Option<String>,

    /// Username for the token request (overrides profile)
    #[arg(long, short = 'u', env = "ISEPIC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for the token request
    #[arg(long, env = "ISEPIC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Full service base URL, replacing https://<host>:9094
    #[arg(long, env = "ISEPIC_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,

    /// Output format (defaults to the config's `defaults.output`, then table)
    #[arg(long, short = 'o', env = "ISEPIC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verify the ISE-PIC TLS certificate on mapping requests
    #[arg(long, env = "ISEPIC_VERIFY_TLS", global = true, conflicts_with = "insecure")]
    pub verify_tls: bool,

    /// Never verify TLS certificates, even if the profile asks to
    #[arg(long, short = 'k', env = "ISEPIC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ISEPIC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Key/value table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, identifiers only (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the add → delete → delete-by-agent walkthrough against a node
    Demo(DemoArgs),

    /// Request an access token and print it
    Token,

    /// Publish a user → source IP mapping
    #[command(alias = "a")]
    Add(AddArgs),

    /// Delete one mapping by id
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Delete every mapping reported by an agent
    DeleteByAgent(DeleteByAgentArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Demo ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DemoArgs {
    /// ISE-PIC host or IP address
    pub host: String,

    /// Username for the token request
    pub username: String,

    /// Password for the token request
    pub password: String,

    /// Agent id used as agent info and for the final bulk delete
    pub agent_id: String,
}

// ── Mapping commands ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AddArgs {
    /// User name to bind
    #[arg(long)]
    pub user: String,

    /// Source IP address of the user's session
    #[arg(long = "src-ip")]
    pub src_ip: String,

    /// Domain of the user
    #[arg(long)]
    pub domain: String,

    /// Agent info (defaults to the profile's agent_id)
    #[arg(long)]
    pub agent_info: Option<String>,

    /// Event time as YYYY-MM-DDTHH:MM:SSZ (defaults to now)
    #[arg(long)]
    pub timestamp: Option<String>,

    /// First port of the user's PAT block
    #[arg(long, requires_all = ["pat_end", "pat_range_start"])]
    pub pat_start: Option<u32>,

    /// Last port of the user's PAT block
    #[arg(long, requires_all = ["pat_start", "pat_range_start"])]
    pub pat_end: Option<u32>,

    /// Start of the PAT range the block belongs to
    #[arg(long, requires_all = ["pat_start", "pat_end"])]
    pub pat_range_start: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Mapping id returned by `add`
    pub id: String,
}

#[derive(Debug, Args)]
pub struct DeleteByAgentArgs {
    /// Agent id (defaults to the profile's agent_id)
    pub agent_id: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactively create a profile
    Init,

    /// Show the resolved configuration (passwords redacted)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
