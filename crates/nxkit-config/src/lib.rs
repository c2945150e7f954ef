//! Shared configuration for nxkit.
//!
//! TOML switch profiles, the `~/.netauth` credential file, password
//! resolution (env + keyring + plaintext), and translation to
//! `nxkit_api::DeviceEndpoint`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use nxkit_api::{Credentials, CredentialsProvider, DeviceEndpoint, Protocol, TlsMode, TlsVersion};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "nxkit";

/// Environment variable consulted for the password when the profile names none.
pub const PASSWORD_ENV: &str = "NXKIT_PASSWORD";

/// Environment variable consulted for the username when the profile has none.
pub const USERNAME_ENV: &str = "NXKIT_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named switch profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub min_tls: TlsVersion,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
            min_tls: TlsVersion::default(),
        }
    }
}

fn default_output() -> String {
    "text".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named switch profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Switch hostname or IP address.
    pub host: String,

    /// "http" or "https".
    #[serde(default)]
    pub protocol: Protocol,

    /// Override the protocol's default port.
    pub port: Option<u16>,

    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout, in seconds.
    pub timeout: Option<u64>,

    /// Override the minimum TLS version.
    pub min_tls: Option<TlsVersion>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "nxkit", "nxkit").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nxkit");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path`, and `NXKIT_` variables.
///
/// Nested keys use a double underscore: `NXKIT_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("NXKIT_")
                .ignore(&["PASSWORD", "USERNAME", "PROFILE", "HOST", "TIMEOUT"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── .netauth credential file ────────────────────────────────────────

#[derive(Deserialize)]
struct NetAuthEntry {
    username: String,
    password: String,
}

/// Credentials from a YAML file shaped `{vendor: {model: {username, password}}}`.
///
/// A missing file, unreadable YAML, or an absent vendor/model pair all yield
/// no credentials.
#[derive(Debug, Clone)]
pub struct NetAuthFile {
    path: PathBuf,
    vendor: String,
    model: String,
}

impl NetAuthFile {
    pub fn new(path: impl Into<PathBuf>, vendor: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            vendor: vendor.into(),
            model: model.into(),
        }
    }

    /// `~/.netauth`, or `None` when no home directory is known.
    pub fn in_home(vendor: impl Into<String>, model: impl Into<String>) -> Option<Self> {
        let home = BaseDirs::new()?.home_dir().join(".netauth");
        Some(Self::new(home, vendor, model))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<Credentials> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let doc: serde_yaml::Value = match serde_yaml::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring malformed credential file");
                return None;
            }
        };
        let entry = doc.get(self.vendor.as_str())?.get(self.model.as_str())?;
        let entry: NetAuthEntry = serde_yaml::from_value(entry.clone()).ok()?;
        Some(Credentials::new(entry.username, entry.password))
    }
}

impl CredentialsProvider for NetAuthFile {
    fn credentials(&self, _host: &str) -> Option<Credentials> {
        self.load()
    }
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve a password without CLI flags.
///
/// Order: the env var named by `password_env`, `NXKIT_PASSWORD`, the system
/// keyring, then the plaintext profile value.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Some(SecretString::from(pw));
    }

    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Some(SecretString::from(pw));
        }
    }

    profile.password.clone().map(SecretString::from)
}

/// Resolve login credentials for a profile.
///
/// A configured username paired with a resolvable password wins; otherwise
/// each provider is asked in order for the profile's host.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    providers: &[&dyn CredentialsProvider],
) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok());

    if let Some(username) = username {
        if let Some(password) = resolve_password(profile, profile_name) {
            return Ok(Credentials::new(username, password));
        }
    }

    providers
        .iter()
        .find_map(|p| p.credentials(&profile.host))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// TLS settings for a profile: `insecure` beats `ca_cert`, otherwise the
/// platform roots.
pub fn profile_tls(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build a `DeviceEndpoint` from a profile and already-resolved credentials.
pub fn profile_to_endpoint(
    profile: &Profile,
    defaults: &Defaults,
    credentials: Credentials,
) -> Result<DeviceEndpoint, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "host cannot be empty".into(),
        });
    }

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let mut endpoint = DeviceEndpoint::new(profile.host.clone(), credentials)
        .with_protocol(profile.protocol)
        .with_tls(profile_tls(profile, defaults))
        .with_min_tls(profile.min_tls.unwrap_or(defaults.min_tls))
        .with_timeout(timeout)
        .map_err(|e| ConfigError::Validation {
            field: "timeout".into(),
            reason: e.to_string(),
        })?;
    if let Some(port) = profile.port {
        endpoint = endpoint.with_port(port);
    }
    Ok(endpoint)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn netauth(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn netauth_returns_configured_user() {
        let file = netauth(
            "cisco:\n  nexus:\n    username: admin\n    password: s3cret\n\
             arista:\n  eos:\n    username: other\n    password: x\n",
        );
        let creds = NetAuthFile::new(file.path(), "cisco", "nexus")
            .credentials("10.0.0.1")
            .unwrap();
        assert_eq!(creds.username(), "admin");
        assert_eq!(creds.password().expose_secret(), "s3cret");
    }

    #[test]
    fn netauth_missing_file_or_entry_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = NetAuthFile::new(dir.path().join(".netauth"), "cisco", "nexus");
        assert!(missing.load().is_none());

        let file = netauth("cisco:\n  n9k:\n    username: admin\n    password: pw\n");
        assert!(NetAuthFile::new(file.path(), "cisco", "nexus").load().is_none());
        assert!(NetAuthFile::new(file.path(), "juniper", "n9k").load().is_none());
    }

    #[test]
    fn netauth_malformed_yields_none() {
        let file = netauth("cisco: [unclosed\n  nexus: {");
        assert!(NetAuthFile::new(file.path(), "cisco", "nexus").load().is_none());

        let file = netauth("cisco:\n  nexus:\n    username: admin\n");
        assert!(NetAuthFile::new(file.path(), "cisco", "nexus").load().is_none());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 45

[profiles.lab]
host = "192.0.2.10"
protocol = "https"
port = 8443
username = "admin"
password_env = "LAB_SWITCH_PASSWORD"
min_tls = "1.3"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 45);
        let lab = cfg.profiles.get("lab").unwrap();
        assert_eq!(lab.host, "192.0.2.10");
        assert_eq!(lab.protocol, Protocol::Https);
        assert_eq!(lab.port, Some(8443));
        assert_eq!(lab.min_tls, Some(TlsVersion::Tls13));
        assert_eq!(lab.password_env.as_deref(), Some("LAB_SWITCH_PASSWORD"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "core".into(),
            Profile {
                host: "core-sw1".into(),
                username: Some("ops".into()),
                insecure: Some(true),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let core = loaded.profiles.get("core").unwrap();
        assert_eq!(core.host, "core-sw1");
        assert_eq!(core.protocol, Protocol::Http);
        assert_eq!(core.insecure, Some(true));
    }

    #[test]
    fn providers_fill_in_when_profile_has_no_username() {
        let file = netauth("cisco:\n  nexus:\n    username: fromfile\n    password: pw\n");
        let provider = NetAuthFile::new(file.path(), "cisco", "nexus");
        let profile = Profile {
            host: "sw1".into(),
            ..Profile::default()
        };
        // NXKIT_USERNAME may leak in from the environment; only assert when unset.
        if std::env::var(USERNAME_ENV).is_err() {
            let creds = resolve_credentials(&profile, "unit-test", &[&provider]).unwrap();
            assert_eq!(creds.username(), "fromfile");

            let err = resolve_credentials(&profile, "unit-test", &[]).unwrap_err();
            assert!(matches!(err, ConfigError::NoCredentials { .. }));
        }
    }

    #[test]
    fn endpoint_from_profile() {
        let profile = Profile {
            host: "sw1".into(),
            protocol: Protocol::Https,
            port: Some(8443),
            ca_cert: Some(PathBuf::from("/etc/nxkit/ca.pem")),
            timeout: Some(10),
            ..Profile::default()
        };
        let endpoint =
            profile_to_endpoint(&profile, &Defaults::default(), Credentials::new("u", "p")).unwrap();
        assert_eq!(endpoint.url().unwrap().as_str(), "https://sw1:8443/ins");
        assert_eq!(endpoint.timeout(), Duration::from_secs(10));
        assert_eq!(
            endpoint.transport().tls,
            TlsMode::CustomCa(PathBuf::from("/etc/nxkit/ca.pem"))
        );
        assert_eq!(endpoint.transport().min_tls, TlsVersion::Tls12);
    }

    #[test]
    fn endpoint_rejects_zero_timeout_and_empty_host() {
        let creds = Credentials::new("u", "p");
        let zero = Profile {
            host: "sw1".into(),
            timeout: Some(0),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_endpoint(&zero, &Defaults::default(), creds.clone()),
            Err(ConfigError::Validation { field, .. }) if field == "timeout"
        ));
        let empty = Profile::default();
        assert!(matches!(
            profile_to_endpoint(&empty, &Defaults::default(), creds),
            Err(ConfigError::Validation { field, .. }) if field == "host"
        ));
    }

    #[test]
    fn insecure_overrides_ca_cert() {
        let profile = Profile {
            host: "sw1".into(),
            insecure: Some(true),
            ca_cert: Some(PathBuf::from("ca.pem")),
            ..Profile::default()
        };
        assert_eq!(profile_tls(&profile, &Defaults::default()), TlsMode::DangerAcceptInvalid);
    }
}
