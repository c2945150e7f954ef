// NX-API request envelope
//
// Every call is one `<ins_api>` document. The layout is fixed by the
// device firmware; only the message type, session id, input and output
// format vary between calls.

use std::fmt;
use std::str::FromStr;

use quick_xml::escape::partial_escape;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::batch;
use crate::error::Error;

/// The only protocol version the `ins_api` endpoint accepts.
pub const PROTOCOL_VERSION: &str = "0.1";

/// Session id sent when the caller does not choose one.
pub const DEFAULT_SID: &str = "sid";

/// Chunked responses are never requested.
const CHUNK: &str = "0";

/// How the device should interpret `<input>`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageType {
    /// `show` command with structured (XML/JSON) body.
    CliShow,
    /// `show` command with the raw CLI text as body.
    CliShowAscii,
    /// Configuration commands.
    CliConf,
    /// Bash shell command.
    Bash,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cli_show" => Ok(Self::CliShow),
            "cli_show_ascii" => Ok(Self::CliShowAscii),
            "cli_conf" => Ok(Self::CliConf),
            "bash" => Ok(Self::Bash),
            other => Err(Error::input(format!(
                "message type must be cli_show, cli_show_ascii, cli_conf or bash, got '{other}'"
            ))),
        }
    }
}

/// Encoding of the response envelope.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(Error::input(format!(
                "output format must be xml or json, got '{other}'"
            ))),
        }
    }
}

/// One outbound unit of work.
///
/// Built fresh per call. The command text is opaque: nothing here checks
/// that it is valid NX-OS syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    msg_type: MessageType,
    input: String,
    output_format: OutputFormat,
    sid: String,
}

impl Request {
    pub fn new(msg_type: MessageType, input: impl Into<String>) -> Self {
        Self {
            msg_type,
            input: input.into(),
            output_format: OutputFormat::default(),
            sid: DEFAULT_SID.into(),
        }
    }

    /// `cli_show` request for a single command.
    pub fn show(command: impl Into<String>) -> Self {
        Self::new(MessageType::CliShow, command)
    }

    /// `cli_show_ascii` request for a single command.
    pub fn show_ascii(command: impl Into<String>) -> Self {
        Self::new(MessageType::CliShowAscii, command)
    }

    /// `cli_conf` request carrying an ordered batch of configuration lines.
    pub fn config<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(MessageType::CliConf, batch::join(commands))
    }

    /// `bash` request.
    pub fn bash(command: impl Into<String>) -> Self {
        Self::new(MessageType::Bash, command)
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = sid.into();
        self
    }

    /// Pin the protocol version. Only `0.1` is accepted.
    pub fn with_version(self, version: &str) -> Result<Self, Error> {
        if version == PROTOCOL_VERSION {
            Ok(self)
        } else {
            Err(Error::input(format!(
                "only NX-API version {PROTOCOL_VERSION} is supported, got '{version}'"
            )))
        }
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Number of commands in `<input>`; configuration batches count lines.
    pub fn command_count(&self) -> usize {
        match self.msg_type {
            MessageType::CliConf => batch::count(&self.input).max(1),
            _ => 1,
        }
    }

    /// Serialize to the `ins_api` XML envelope.
    ///
    /// Only `&`, `<` and `>` are escaped in the free-text fields; anything
    /// else is copied through byte-for-byte.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.input.len());
        xml.push_str("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n");
        xml.push_str("<ins_api>\n");
        push_element(&mut xml, "type", self.msg_type.as_str());
        push_element(&mut xml, "version", PROTOCOL_VERSION);
        push_element(&mut xml, "chunk", CHUNK);
        push_element(&mut xml, "sid", &partial_escape(&self.sid));
        push_element(&mut xml, "input", &partial_escape(&self.input));
        push_element(&mut xml, "output_format", self.output_format.as_str());
        xml.push_str("</ins_api>\n");
        xml
    }
}

fn push_element(xml: &mut String, tag: &str, value: &str) {
    xml.push('<');
    xml.push_str(tag);
    xml.push('>');
    xml.push_str(value);
    xml.push_str("</");
    xml.push_str(tag);
    xml.push_str(">\n");
}
