// ── Device facade ──
//
// One NX-OS switch reached through NX-API. Holds the endpoint and a ready
// client; the operation modules (checkpoint, files, facts) add inherent
// methods in their own files.

use nxkit_api::batch;
use nxkit_api::{CliOutcome, DeviceEndpoint, NxapiClient, Request};
use tracing::debug;

use crate::error::CoreError;

/// A switch and the client used to talk to it.
#[derive(Debug, Clone)]
pub struct Device {
    endpoint: DeviceEndpoint,
    client: NxapiClient,
}

impl Device {
    /// Build a device handle, constructing the HTTP client from the
    /// endpoint's transport settings.
    pub fn new(endpoint: DeviceEndpoint) -> Result<Self, CoreError> {
        let client = NxapiClient::new(&endpoint)?;
        Ok(Self { endpoint, client })
    }

    /// Build a device handle around an already configured client.
    pub fn with_client(endpoint: DeviceEndpoint, client: NxapiClient) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &DeviceEndpoint {
        &self.endpoint
    }

    pub fn client(&self) -> &NxapiClient {
        &self.client
    }

    pub fn host(&self) -> &str {
        self.endpoint.host()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// `show` with a structured body.
    pub async fn show(&self, command: &str) -> Result<CliOutcome, CoreError> {
        Ok(self.client.show(command).await?)
    }

    /// `show` with the raw CLI text as body.
    pub async fn show_text(&self, command: &str) -> Result<CliOutcome, CoreError> {
        Ok(self.client.show_text(command).await?)
    }

    /// Ordered batch of configuration lines.
    pub async fn config<I, S>(&self, commands: I) -> Result<Vec<CliOutcome>, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.client.config(commands).await?)
    }

    pub async fn bash(&self, command: &str) -> Result<CliOutcome, CoreError> {
        Ok(self.client.bash(command).await?)
    }

    /// Apply several command groups as one configuration request.
    ///
    /// Empty groups are skipped; nothing is sent when every group is empty.
    pub async fn execute_commands<S: AsRef<str>>(
        &self,
        groups: &[Vec<S>],
    ) -> Result<Vec<CliOutcome>, CoreError> {
        let joined = batch::join_nested(groups);
        if joined.is_empty() {
            debug!("no configuration commands to send");
            return Ok(Vec::new());
        }
        let request = self.client.prepare(Request::new(
            nxkit_api::MessageType::CliConf,
            joined,
        ));
        Ok(self.client.execute(&request).await?.into_outcomes())
    }

    /// Send `request` and return outcomes without raising CLI failures.
    pub(crate) async fn probe(&self, request: Request) -> Result<Vec<CliOutcome>, CoreError> {
        let request = self.client.prepare(request);
        Ok(self.client.execute_unchecked(&request).await?)
    }
}

/// Text body of a `cli_show_ascii` outcome, empty when the switch sent none.
pub(crate) fn text_body(outcome: &CliOutcome) -> &str {
    outcome.text().unwrap_or_default()
}
