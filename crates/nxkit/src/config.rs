//! CLI configuration: thin wrapper around `nxkit_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--host,
//! --username, --insecure, ...) on top of the selected profile.

use nxkit_api::{Credentials, CredentialsProvider, DeviceEndpoint, Protocol, TlsVersion};
use nxkit_config::NetAuthFile;
use tracing::debug;

use crate::cli::{GlobalOpts, ProtocolArg, TlsVersionArg};
use crate::error::CliError;

pub use nxkit_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// Vendor and model keys looked up in `~/.netauth`.
const NETAUTH_VENDOR: &str = "cisco";
const NETAUTH_MODEL: &str = "nexus";

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Http => Self::Http,
            ProtocolArg::Https => Self::Https,
        }
    }
}

impl From<TlsVersionArg> for TlsVersion {
    fn from(arg: TlsVersionArg) -> Self {
        match arg {
            TlsVersionArg::V1_2 => Self::Tls12,
            TlsVersionArg::V1_3 => Self::Tls13,
        }
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Pick the profile to start from.
///
/// An explicitly requested profile must exist; the default one may be
/// missing, in which case flags alone describe the switch.
fn select_profile(global: &GlobalOpts, config: &mut Config, name: &str) -> Result<Profile, CliError> {
    if let Some(profile) = config.profiles.remove(name) {
        return Ok(profile);
    }
    if global.profile.is_some() {
        let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: name.into(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    Ok(Profile::default())
}

/// Fold flag overrides into a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(protocol) = global.protocol {
        profile.protocol = protocol.into();
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.ca_cert.is_some() {
        profile.ca_cert.clone_from(&global.ca_cert);
    }
    if let Some(min_tls) = global.min_tls {
        profile.min_tls = Some(min_tls.into());
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
}

/// Build the switch endpoint from config, profile and flags.
pub fn resolve_endpoint(global: &GlobalOpts) -> Result<(DeviceEndpoint, String), CliError> {
    let mut cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);
    let mut profile = select_profile(global, &mut cfg, &profile_name)?;
    apply_overrides(&mut profile, global);

    if profile.host.trim().is_empty() {
        return Err(CliError::NoHost {
            path: config_path().display().to_string(),
        });
    }

    let credentials = match (&profile.username, &global.password) {
        (Some(username), Some(password)) => Credentials::new(username.clone(), password.clone()),
        (None, Some(_)) => {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: "--password needs a username from --username, NXKIT_USERNAME \
                         or the profile"
                    .into(),
            });
        }
        _ => {
            let netauth = NetAuthFile::in_home(NETAUTH_VENDOR, NETAUTH_MODEL);
            let providers: Vec<&dyn CredentialsProvider> = netauth
                .iter()
                .map(|p| p as &dyn CredentialsProvider)
                .collect();
            nxkit_config::resolve_credentials(&profile, &profile_name, &providers)?
        }
    };

    debug!(
        profile = %profile_name,
        host = %profile.host,
        username = credentials.username(),
        "resolved switch endpoint"
    );
    let endpoint = nxkit_config::profile_to_endpoint(&profile, &cfg.defaults, credentials)?;
    Ok((endpoint, profile_name))
}
