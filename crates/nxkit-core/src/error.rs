// ── Core error types ──
//
// User-facing errors from nxkit-core. The `From<nxkit_api::Error>` impl
// folds transport-layer failures into a handful of operator-meaningful
// variants; device rejections keep their code, message and position.

use std::time::Duration;

use nxkit_api::CliErrorKind;
use nxkit_api::error::describe_cli;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to switch at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Switch did not answer within {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Device errors ────────────────────────────────────────────────
    #[error("{}", describe_cli(.code, .message, .index, .batch_len))]
    Cli {
        code: String,
        message: String,
        index: usize,
        batch_len: usize,
        kind: CliErrorKind,
    },

    #[error("Unexpected reply from switch: {message}")]
    Decode { message: String },

    #[error("Switch returned HTTP {status}")]
    Http { status: u16, body: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Could not transfer file. {message}")]
    FileTransfer { message: String },

    #[error("Could not calculate diff: {message}")]
    Diff { message: String },
}

impl CoreError {
    pub(crate) fn file_transfer(message: impl Into<String>) -> Self {
        Self::FileTransfer {
            message: message.into(),
        }
    }

    /// Semantic category for CLI rejections.
    pub fn cli_kind(&self) -> Option<CliErrorKind> {
        match self {
            Self::Cli { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `true` when the switch said the referenced object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.cli_kind() == Some(CliErrorKind::NotFound)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nxkit_api::Error> for CoreError {
    fn from(err: nxkit_api::Error) -> Self {
        match err {
            nxkit_api::Error::Cli {
                code,
                message,
                index,
                batch_len,
            } => {
                let kind = CliErrorKind::classify(&code, &message);
                CoreError::Cli {
                    code,
                    message,
                    index,
                    batch_len,
                    kind,
                }
            }
            nxkit_api::Error::Input { message } => CoreError::InvalidInput { message },
            nxkit_api::Error::InvalidUrl(e) => CoreError::InvalidInput {
                message: format!("invalid switch address: {e}"),
            },
            nxkit_api::Error::Decode { message, .. } => CoreError::Decode { message },
            nxkit_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nxkit_api::Error::Http { status, body } => CoreError::Http { status, body },
            nxkit_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            nxkit_api::Error::Transport(e) => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            nxkit_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                url: "<tls>".into(),
                reason,
            },
        }
    }
}
