//! Clap derive structures for the `nxkit` CLI.
//!
//! Kept free of workspace crates so `build.rs` can compile it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nxkit -- drive Cisco NX-OS switches over NX-API
#[derive(Debug, Parser)]
#[command(
    name = "nxkit",
    version,
    about = "Run commands and manage files on Cisco NX-OS switches via NX-API",
    long_about = "Sends CLI commands to an NX-OS switch's /ins endpoint and renders\n\
        the replies. Connection details come from a profile in the config\n\
        file, from flags, or from NXKIT_* environment variables.",
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
    /// Switch profile to use
    #[arg(long, short = 'p', env = "NXKIT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Switch hostname or IP address (overrides profile)
    #[arg(long, short = 'H', env = "NXKIT_HOST", global = true)]
    pub host: Option<String>,

    /// Protocol for the NX-API endpoint
    #[arg(long, global = true)]
    pub protocol: Option<ProtocolArg>,

    /// NX-API port (defaults to the protocol's port)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Login username
    #[arg(long, short = 'u', env = "NXKIT_USERNAME", global = true)]
    pub username: Option<String>,

    /// Login password (prefer the keyring or NXKIT_PASSWORD)
    #[arg(long, global = true, hide_env = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NXKIT_OUTPUT",
        default_value = "text",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NXKIT_INSECURE", global = true)]
    pub insecure: bool,

    /// PEM file with the CA that signed the switch certificate
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// Minimum TLS version for https
    #[arg(long, global = true)]
    pub min_tls: Option<TlsVersionArg>,

    /// Request timeout in seconds
    #[arg(long, env = "NXKIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProtocolArg {
    Http,
    Https,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TlsVersionArg {
    #[value(name = "1.2")]
    V1_2,
    #[value(name = "1.3")]
    V1_3,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Device text output and tables (default)
    Text,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
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
    /// Run a show command
    #[command(alias = "sh")]
    Show(ShowArgs),

    /// Apply configuration commands as one batch
    #[command(alias = "conf")]
    Config(ConfigArgs),

    /// Run a bash command on the switch
    Bash(BashArgs),

    /// Checkpoints, diffs and rollback
    #[command(alias = "cp")]
    Checkpoint(CheckpointArgs),

    /// Inspect and manage the switch filesystem
    #[command(alias = "fs")]
    Files(FilesArgs),

    /// Copy files to or from the switch over SCP
    Copy(CopyArgs),

    /// Show version, interface, module and environment facts
    Facts,

    /// Show the configured hostname
    Hostname(HostnameArgs),

    /// List features or check whether one is enabled
    Features(FeaturesArgs),

    /// Manage nxkit profiles and stored passwords
    Profile(ProfileArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Show commands; several run as one batch
    #[arg(required = true)]
    pub commands: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration commands, in order
    #[arg(required = true)]
    pub commands: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BashArgs {
    /// Command line passed to the switch's bash shell
    pub command: String,
}

#[derive(Debug, Args)]
pub struct CheckpointArgs {
    #[command(subcommand)]
    pub command: CheckpointCommand,
}

#[derive(Debug, Subcommand)]
pub enum CheckpointCommand {
    /// Save the running configuration to a checkpoint file
    Save {
        /// Target file, e.g. bootflash:pre-change.cfg
        file: String,
    },

    /// Print the running configuration captured as a checkpoint
    Running,

    /// Print the rollback patch from a checkpoint file to the running config
    Diff {
        /// Checkpoint file
        file: String,
    },

    /// Roll the running configuration back to a checkpoint file
    Rollback {
        /// Checkpoint file
        file: String,
    },
}

#[derive(Debug, Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// List files in a directory
    #[command(alias = "ls")]
    List {
        #[arg(default_value = "bootflash:")]
        path: String,
    },

    /// Check that every directory along a path exists
    Check { path: String },

    /// Create a directory
    Mkdir { path: String },

    /// Delete a file or directory
    #[command(alias = "rm")]
    Delete { path: String },

    /// Free bytes on bootflash:
    Free,
}

#[derive(Debug, Args)]
pub struct CopyArgs {
    #[command(subcommand)]
    pub command: CopyCommand,

    /// SSH port for SCP
    #[arg(long, default_value = "22", global = true)]
    pub scp_port: u16,
}

#[derive(Debug, Subcommand)]
pub enum CopyCommand {
    /// Copy a local file to the switch
    Push {
        /// Local file
        src: PathBuf,
        /// Destination on the switch (defaults to the file name)
        dst: Option<String>,
        /// Copy even if the switch already has an identical file
        #[arg(long)]
        force: bool,
    },

    /// Copy a switch file to this host
    Pull {
        /// Local destination
        local: PathBuf,
        /// File on the switch
        remote: String,
    },

    /// Compare a local file with the switch's copy by MD5
    Verify {
        src: PathBuf,
        dst: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct HostnameArgs {
    /// Keep the domain part
    #[arg(long)]
    pub domain: bool,
}

#[derive(Debug, Args)]
pub struct FeaturesArgs {
    /// Feature to check, by CLI name (e.g. ssh, bgp)
    pub feature: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Print the config file path
    Path,

    /// Display the loaded configuration
    Show,

    /// List profile names
    List,

    /// Add or replace a profile
    Add {
        name: String,
        #[arg(long)]
        host: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        protocol: Option<ProtocolArg>,
        #[arg(long)]
        port: Option<u16>,
        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// Store a profile password in the system keyring
    SetPassword { name: String },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
