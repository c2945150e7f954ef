// NX-API HTTP client
//
// Wraps `reqwest::Client` with the `/ins` URL, basic auth and the session
// cookie header. One `send` is exactly one POST; nothing is retried and no
// cookies are captured from replies.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap};
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::Credentials;
use crate::endpoint::DeviceEndpoint;
use crate::error::Error;
use crate::request::{DEFAULT_SID, OutputFormat, Request};
use crate::response::{self, CliOutcome};

/// Cookie value sent when the caller has not threaded one through.
pub const DEFAULT_COOKIE: &str = "no-cookie";

/// Unparsed transport result of one POST.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Decoded and checked reply: every command in the request succeeded.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub outcomes: Vec<CliOutcome>,
}

impl Reply {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_outcomes(self) -> Vec<CliOutcome> {
        self.outcomes
    }

    /// The single outcome of a one-command request.
    pub fn into_single(self) -> Result<CliOutcome, Error> {
        self.outcomes
            .into_iter()
            .next()
            .ok_or_else(|| Error::Decode {
                message: "reply contained no output entries".into(),
                body: String::new(),
            })
    }
}

/// Client for one switch's NX-API endpoint.
///
/// Holds no mutable state: it is `Send + Sync` and can be shared by
/// reference between tasks.
#[derive(Debug, Clone)]
pub struct NxapiClient {
    http: reqwest::Client,
    url: Url,
    credentials: Credentials,
    cookie: String,
    sid: String,
    timeout: Duration,
    output_format: OutputFormat,
}

impl NxapiClient {
    /// Create a client for `endpoint`, building a `reqwest::Client` from its
    /// transport settings.
    pub fn new(endpoint: &DeviceEndpoint) -> Result<Self, Error> {
        let http = endpoint.transport().build_client()?;
        Self::with_client(http, endpoint)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: &DeviceEndpoint) -> Result<Self, Error> {
        Ok(Self {
            http,
            url: endpoint.url()?,
            credentials: endpoint.credentials().clone(),
            cookie: DEFAULT_COOKIE.into(),
            sid: DEFAULT_SID.into(),
            timeout: endpoint.timeout(),
            output_format: OutputFormat::default(),
        })
    }

    /// Session cookie to send on every request.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = cookie.into();
        self
    }

    /// Session id used by the convenience methods.
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = sid.into();
        self
    }

    /// Reply encoding requested by the convenience methods.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    // ── Transport ────────────────────────────────────────────────────

    /// POST `request` and return the raw reply without decoding it.
    pub async fn send(&self, request: &Request) -> Result<RawResponse, Error> {
        debug!(
            msg_type = %request.msg_type(),
            commands = request.command_count(),
            "POST {}",
            self.url
        );

        let (username, password) = self.credentials.basic_auth();
        let resp = self
            .http
            .post(self.url.clone())
            .basic_auth(username, Some(password))
            .header(COOKIE, &self.cookie)
            .header(CONTENT_TYPE, "text/xml")
            .timeout(self.timeout)
            .body(request.to_xml())
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await.map_err(|e| self.classify_transport(e))?;
        trace!(%status, bytes = body.len(), "NX-API reply received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Send `request`, decode the reply and raise the first CLI failure.
    pub async fn execute(&self, request: &Request) -> Result<Reply, Error> {
        let raw = self.send(request).await?;
        let outcomes = response::check(decode_reply(&raw, request.output_format())?)?;
        debug!(outcomes = outcomes.len(), "NX-API request succeeded");
        Ok(Reply {
            status: raw.status,
            headers: raw.headers,
            outcomes,
        })
    }

    /// Send `request` and decode the reply without raising CLI failures.
    ///
    /// For probes where a `clierror` is an expected answer rather than a
    /// fault; each outcome still carries its `clierror` field.
    pub async fn execute_unchecked(&self, request: &Request) -> Result<Vec<CliOutcome>, Error> {
        let raw = self.send(request).await?;
        decode_reply(&raw, request.output_format())
    }

    // ── Convenience ──────────────────────────────────────────────────

    /// Run one `show` command with a structured body.
    pub async fn show(&self, command: &str) -> Result<CliOutcome, Error> {
        let request = self.prepare(Request::show(command));
        self.execute(&request).await?.into_single()
    }

    /// Run one `show` command and return the raw CLI text body.
    pub async fn show_text(&self, command: &str) -> Result<CliOutcome, Error> {
        let request = self.prepare(Request::show_ascii(command));
        self.execute(&request).await?.into_single()
    }

    /// Apply an ordered batch of configuration lines in one request.
    ///
    /// On a [`Error::Cli`] the commands before the failing index may have
    /// taken effect; re-read device state rather than assuming a rollback.
    pub async fn config<I, S>(&self, commands: I) -> Result<Vec<CliOutcome>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let request = self.prepare(Request::config(commands));
        if request.input().is_empty() {
            return Err(Error::input("configuration batch is empty"));
        }
        Ok(self.execute(&request).await?.into_outcomes())
    }

    /// Run a bash command on the switch.
    pub async fn bash(&self, command: &str) -> Result<CliOutcome, Error> {
        let request = self.prepare(Request::bash(command));
        self.execute(&request).await?.into_single()
    }

    /// Stamp this client's session id and output format onto `request`.
    pub fn prepare(&self, request: Request) -> Request {
        request
            .with_sid(self.sid.clone())
            .with_output_format(self.output_format)
    }

    fn classify_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            warn!(timeout = ?self.timeout, "NX-API request timed out");
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Decode a raw reply, folding HTTP status into the error taxonomy.
///
/// 401 is an authentication failure. Any other status is decoded first,
/// since some releases report CLI errors with HTTP 500; only a non-success
/// reply that carries no envelope becomes [`Error::Http`].
pub fn decode_reply(raw: &RawResponse, format: OutputFormat) -> Result<Vec<CliOutcome>, Error> {
    if raw.status == StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: format!("device rejected credentials (HTTP {})", raw.status.as_u16()),
        });
    }

    match response::decode(&raw.body, format) {
        Ok(outcomes) => Ok(outcomes),
        Err(Error::Decode { .. }) if !raw.status.is_success() => Err(Error::Http {
            status: raw.status.as_u16(),
            body: raw.body.clone(),
        }),
        Err(e) => Err(e),
    }
}
