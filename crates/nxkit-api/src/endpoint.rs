// Device endpoint: where one switch's NX-API lives and how to reach it.

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::{TlsMode, TlsVersion, TransportConfig};

/// Fixed NX-API path.
pub const INS_PATH: &str = "/ins";

/// URL scheme used to reach NX-API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(Error::input(format!(
                "protocol must be http or https, got '{other}'"
            ))),
        }
    }
}

/// One switch's NX-API endpoint.
///
/// Created once per switch and held for the program's lifetime. Every
/// [`crate::NxapiClient`] built from it borrows these settings.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    host: String,
    protocol: Protocol,
    port: Option<u16>,
    credentials: Credentials,
    transport: TransportConfig,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            protocol: Protocol::default(),
            port: None,
            credentials,
            transport: TransportConfig::default(),
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Round-trip timeout for every request. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        if timeout.is_zero() {
            return Err(Error::input("timeout must be greater than zero"));
        }
        self.transport.timeout = timeout;
        Ok(self)
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.transport.tls = tls;
        self
    }

    pub fn with_min_tls(mut self, version: TlsVersion) -> Self {
        self.transport.min_tls = version;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeout(&self) -> Duration {
        self.transport.timeout
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    /// `{protocol}://{host}[:{port}]/ins`, with IPv6 literals bracketed.
    pub fn url(&self) -> Result<Url, Error> {
        let host = if self.host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let authority = match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        Ok(Url::parse(&format!("{}://{authority}{INS_PATH}", self.protocol))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn endpoint(host: &str) -> DeviceEndpoint {
        DeviceEndpoint::new(host, Credentials::new("admin", SecretString::from("x".to_string())))
    }

    #[test]
    fn url_defaults_to_http_without_port() {
        let url = endpoint("sw1.example.net").url().unwrap();
        assert_eq!(url.as_str(), "http://sw1.example.net/ins");
    }

    #[test]
    fn url_includes_protocol_and_port() {
        let url = endpoint("10.0.0.1")
            .with_protocol(Protocol::Https)
            .with_port(8443)
            .url()
            .unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.1:8443/ins");
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let url = endpoint("2001:db8::1").with_port(80).url().unwrap();
        assert_eq!(url.host_str(), Some("[2001:db8::1]"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = endpoint("sw1").with_timeout(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Input { .. }));

        let ok = endpoint("sw1").with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(ok.timeout(), Duration::from_secs(5));
        assert_eq!(endpoint("sw1").timeout(), Duration::from_secs(30));
    }

    #[test]
    fn protocol_parses_only_http_and_https() {
        assert_eq!("https".parse::<Protocol>().unwrap(), Protocol::Https);
        assert!("ftp".parse::<Protocol>().is_err());
    }
}
