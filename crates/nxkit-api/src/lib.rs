// nxkit-api: Async Rust client for the Cisco NX-OS NX-API endpoint
//
// Three layers, composed linearly:
//   request  -- builds the `ins_api` XML request envelope
//   client   -- one HTTP POST per call (basic auth, session cookie, timeout)
//   response -- decodes the XML/JSON reply and classifies CLI failures

pub mod auth;
pub mod batch;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod xml;

pub use auth::{Credentials, CredentialsProvider, resolve_credentials};
pub use client::{NxapiClient, RawResponse, Reply};
pub use endpoint::{DeviceEndpoint, Protocol};
pub use error::{CliErrorKind, Error};
pub use request::{MessageType, OutputFormat, PROTOCOL_VERSION, Request};
pub use response::{CliFailure, CliOutcome, OutcomeBody};
pub use transport::{TlsMode, TlsVersion, TransportConfig};
