//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use nxkit_api::CliErrorKind;
use nxkit_config::ConfigError;
use nxkit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CLI: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to switch at {url}")]
    #[diagnostic(
        code(nxkit::connection_failed),
        help(
            "Check that the switch is reachable and `feature nxapi` is enabled.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Switch returned HTTP {status}")]
    #[diagnostic(
        code(nxkit::http),
        help("The reply carried no NX-API envelope. Check --protocol and --port.")
    )]
    Http { status: u16 },

    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(nxkit::timeout),
        help("Increase timeout with --timeout or check switch responsiveness.")
    )]
    Timeout { timeout: Duration },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(nxkit::auth_failed),
        help(
            "Verify the username and password.\n\
             Run: nxkit profile set-password {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(nxkit::no_credentials),
        help(
            "Pass --username with NXKIT_PASSWORD set, store a password with\n\
             `nxkit profile set-password {profile}`, or add an entry to ~/.netauth."
        )
    )]
    NoCredentials { profile: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(nxkit::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(nxkit::cli_error))]
    Rejected { message: String },

    #[error("Unexpected reply from switch: {message}")]
    #[diagnostic(code(nxkit::decode))]
    Decode { message: String },

    #[error("{message}")]
    #[diagnostic(code(nxkit::operation_failed))]
    OperationFailed { message: String },

    // ── Usage ────────────────────────────────────────────────────────
    #[error("No switch host given")]
    #[diagnostic(
        code(nxkit::no_host),
        help(
            "Pass --host, set NXKIT_HOST, or add a profile to {path}\n\
             Try: nxkit profile add lab --host 192.0.2.10 --username admin --default"
        )
    )]
    NoHost { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nxkit::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nxkit::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("'{operation}' is not available in this build")]
    #[diagnostic(code(nxkit::unsupported), help("Rebuild with `--features {feature}`."))]
    Unsupported { operation: String, feature: String },

    // ── Configuration / IO ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(nxkit::config))]
    Config(ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(nxkit::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Http { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. } => exit_code::CLI,
            Self::NoHost { .. } | Self::Validation { .. } | Self::Unsupported { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message: _ } => Self::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout { timeout } => Self::Timeout { timeout },

            ref cli @ CoreError::Cli { kind, .. } => {
                let message = cli.to_string();
                match kind {
                    CliErrorKind::NotFound => Self::NotFound { message },
                    CliErrorKind::Rejected => Self::Rejected { message },
                }
            }

            CoreError::Decode { message } => Self::Decode { message },

            CoreError::Http { status, body: _ } => Self::Http { status },

            CoreError::InvalidInput { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            other @ (CoreError::FileTransfer { .. } | CoreError::Diff { .. }) => {
                Self::OperationFailed {
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
