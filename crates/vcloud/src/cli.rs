//! Clap derive structures for the `vcloud` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vcloud -- deploy and manage Vapor Cloud applications
#[derive(Debug, Parser)]
#[command(
    name = "vcloud",
    version,
    about = "Deploy and manage Vapor Cloud applications from the command line",
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
    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VCLOUD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Log in and persist the credential
    Login(LoginArgs),

    /// Forget the persisted credential
    Logout,

    /// Create a new account
    Signup(SignupArgs),

    /// Show the logged-in user
    Me,

    /// Request a password reset email
    ResetPassword(ResetPasswordArgs),

    /// Manage SSH keys
    Ssh(SshArgs),

    /// Inspect applications
    #[command(alias = "app")]
    Apps(AppsArgs),

    /// Inspect environments
    #[command(alias = "env")]
    Envs(EnvsArgs),

    /// Deploy an environment and stream its activity
    Deploy(DeployArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, short = 'p', env = "VCLOUD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(long, short = 'e')]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub organization: String,

    /// Account password (prompted when omitted)
    #[arg(long, short = 'p', env = "VCLOUD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResetPasswordArgs {
    #[arg(long, short = 'e')]
    pub email: String,
}

// ── SSH keys ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SshArgs {
    #[command(subcommand)]
    pub command: SshCommand,
}

#[derive(Debug, Subcommand)]
pub enum SshCommand {
    /// Register a public key
    #[command(group(clap::ArgGroup::new("source").required(true).args(["key", "file"])))]
    Add {
        /// Display name for the key
        #[arg(long, short = 'n')]
        name: String,

        /// Public key text
        #[arg(long)]
        key: Option<String>,

        /// Read the public key from a file
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// List registered keys
    #[command(alias = "ls")]
    List,

    /// Delete a key by name
    #[command(alias = "rm")]
    Delete { name: String },
}

// ── Applications & environments ──────────────────────────────────────

#[derive(Debug, Args)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AppsCommand {
    /// List applications
    #[command(alias = "ls")]
    List,

    /// Show one application by slug
    Show { slug: String },
}

#[derive(Debug, Args)]
pub struct EnvsArgs {
    #[command(subcommand)]
    pub command: EnvsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EnvsCommand {
    /// List environments
    #[command(alias = "ls")]
    List {
        /// Only environments of this application
        #[arg(long)]
        app: Option<Uuid>,
    },
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Environment to deploy
    pub environment: Uuid,

    /// Branch to deploy (defaults to the environment's default branch)
    #[arg(long, short = 'b')]
    pub branch: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Interactive configuration wizard
    Init,
    /// Print the config and credential file locations
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ssh_add_needs_a_key_source() {
        let err = Cli::try_parse_from(["vcloud", "ssh", "add", "-n", "laptop"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["vcloud", "ssh", "add", "-n", "laptop", "--key", "ssh-ed25519 AAAA"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Ssh(SshArgs { command: SshCommand::Add { key: Some(_), file: None, .. } })
        ));
    }

    #[test]
    fn deploy_parses_uuid_and_branch() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["vcloud", "-o", "json", "deploy", &id.to_string(), "-b", "staging"])
            .unwrap();
        match cli.command {
            Command::Deploy(args) => {
                assert_eq!(args.environment, id);
                assert_eq!(args.branch.as_deref(), Some("staging"));
            }
            other => panic!("expected deploy, got {other:?}"),
        }
        assert!(matches!(cli.global.output, OutputFormat::Json));
    }
}
