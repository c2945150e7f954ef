use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `nxkit-api` crate.
///
/// Keeps network-level failures (`Timeout`, `Transport`) apart from device
/// rejections (`Cli`) so callers can decide whether a retry makes sense.
/// `nxkit-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Device ──────────────────────────────────────────────────────
    /// The device rejected one command of the request.
    ///
    /// `code` is the `clierror` text, `message` the accompanying `msg`,
    /// `index` the 0-based position of the failing command in the batch.
    /// Commands before `index` may already have taken effect.
    #[error("{}", describe_cli(.code, .message, .index, .batch_len))]
    Cli {
        code: String,
        message: String,
        index: usize,
        batch_len: usize,
    },

    // ── Caller ──────────────────────────────────────────────────────
    /// Caller-side validation failure (bad version, zero timeout, etc.)
    #[error("Invalid input: {message}")]
    Input { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The reply could not be decoded into the `ins_api` envelope.
    #[error("Could not decode NX-API response: {message}")]
    Decode { message: String, body: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The device answered HTTP 401.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Non-success HTTP status with no decodable envelope in the body.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),
}

/// Semantic category of a CLI rejection.
///
/// NX-OS reports "the thing you asked about is not there" with the same
/// `clierror` envelope as a genuine misconfiguration. Probing callers want
/// to treat the first case as benign state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// The referenced object (ACL, VLAN, file, checkpoint...) does not exist.
    NotFound,
    /// Anything else: syntax errors, invalid values, unsupported commands.
    Rejected,
}

const NOT_FOUND_MARKERS: &[&str] = &[
    "does not exist",
    "not found",
    "no such",
    "not present",
];

impl CliErrorKind {
    /// Classify a `clierror` / `msg` pair.
    pub fn classify(code: &str, message: &str) -> Self {
        let haystack = format!("{code} {message}").to_ascii_lowercase();
        if NOT_FOUND_MARKERS.iter().any(|m| haystack.contains(m)) {
            Self::NotFound
        } else {
            Self::Rejected
        }
    }
}

impl Error {
    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Semantic category for CLI rejections, `None` for every other error.
    pub fn cli_kind(&self) -> Option<CliErrorKind> {
        match self {
            Self::Cli { code, message, .. } => Some(CliErrorKind::classify(code, message)),
            _ => None,
        }
    }

    /// Returns `true` if the device reported that the referenced object
    /// does not exist.
    pub fn is_not_found(&self) -> bool {
        self.cli_kind() == Some(CliErrorKind::NotFound)
    }

    /// 0-based index of the failing command, for CLI rejections.
    pub fn command_index(&self) -> Option<usize> {
        match self {
            Self::Cli { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Operator-facing rendering of a CLI rejection.
///
/// Batches name the 1-based position of the failing command so the line can
/// be found in a multi-line push.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn describe_cli(code: &str, message: &str, index: &usize, batch_len: &usize) -> String {
    if *batch_len > 1 {
        format!(
            "CLI error on command {} of {batch_len}: {code} ({message})",
            index + 1
        )
    } else {
        format!("CLI error: {code} ({message})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(code: &str, message: &str, index: usize, batch_len: usize) -> Error {
        Error::Cli {
            code: code.into(),
            message: message.into(),
            index,
            batch_len,
        }
    }

    #[test]
    fn batch_error_renders_one_based_position() {
        let err = cli("% Invalid command", "Input CLI command error", 1, 3);
        assert_eq!(
            err.to_string(),
            "CLI error on command 2 of 3: % Invalid command (Input CLI command error)"
        );
    }

    #[test]
    fn single_error_omits_position() {
        let err = cli("Invalid command", "bad syntax", 0, 1);
        assert_eq!(err.to_string(), "CLI error: Invalid command (bad syntax)");
    }

    #[test]
    fn not_found_is_distinguished_from_rejection() {
        let missing = cli("ACL web does not exist", "Input CLI command error", 0, 1);
        assert_eq!(missing.cli_kind(), Some(CliErrorKind::NotFound));
        assert!(missing.is_not_found());

        let bad = cli("% Invalid command at '^' marker.", "Input CLI command error", 0, 1);
        assert_eq!(bad.cli_kind(), Some(CliErrorKind::Rejected));
        assert!(!bad.is_not_found());
    }

    #[test]
    fn timeout_is_transient_cli_error_is_not() {
        let timeout = Error::Timeout {
            timeout: Duration::from_millis(200),
        };
        assert!(timeout.is_transient());
        assert_eq!(timeout.to_string(), "Request timed out after 200ms");
        assert!(!cli("x", "y", 0, 1).is_transient());
        assert_eq!(Error::input("nope").cli_kind(), None);
    }
}
