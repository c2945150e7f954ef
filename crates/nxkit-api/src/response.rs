// NX-API response envelope
//
// `ins_api.outputs.output` is a single object when one command was sent
// and a list when a batch was sent. The shape is resolved once here into
// an ordered `Vec<CliOutcome>`; nothing downstream branches on it again.
//
// Fields use `#[serde(default)]` throughout because firmware releases
// disagree about which keys are present, and the XML mirror turns numbers
// into strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::Error;
use crate::request::OutputFormat;
use crate::xml;

// ── Envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    ins_api: InsApi,
}

#[derive(Debug, Deserialize)]
struct InsApi {
    outputs: Outputs,
}

#[derive(Debug, Deserialize)]
struct Outputs {
    output: OneOrMany<RawOutput>,
}

/// A field the device sends as an object for one item and a list for many.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Batch(Vec<T>),
    Single(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Batch(items) => items,
            Self::Single(item) => vec![item],
        }
    }
}

/// One `output` entry exactly as the device sent it.
#[derive(Debug, Deserialize)]
struct RawOutput {
    #[serde(default)]
    body: Value,
    #[serde(default, deserialize_with = "string_like")]
    code: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    msg: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    input: Option<String>,
    /// Present-but-empty decodes to `Some("")`, absent to `None`.
    #[serde(default, deserialize_with = "present_string")]
    clierror: Option<String>,
}

// ── Normalized outcome ───────────────────────────────────────────────

/// Body of one command's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeBody {
    /// Raw CLI text (`cli_show_ascii`, `bash`, or a device that could not
    /// render structured output).
    Text(String),
    /// Structured `show` output; layout is feature specific.
    Structured(Value),
}

impl OutcomeBody {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text)),
            other => Some(Self::Structured(other)),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

/// Why the device rejected one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliFailure {
    /// The `clierror` text.
    pub code: String,
    /// The `msg` text.
    pub message: String,
}

/// Result of one command within a request, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CliOutcome {
    /// 0-based position within the batch.
    pub index: usize,
    /// Command echoed back by the device, if it did so.
    pub input: Option<String>,
    /// Vendor status code, e.g. `"200"` or `"400"`.
    pub code: Option<String>,
    pub msg: Option<String>,
    pub body: Option<OutcomeBody>,
    /// Raw `clierror` field; `Some("")` when the element was present but empty.
    pub clierror: Option<String>,
}

impl CliOutcome {
    /// The rejection carried by this outcome, if any.
    ///
    /// Only a non-empty `clierror` counts as a failure.
    pub fn failure(&self) -> Option<CliFailure> {
        let code = self.clierror.as_deref().filter(|c| !c.trim().is_empty())?;
        Some(CliFailure {
            code: code.to_owned(),
            message: self.msg.clone().unwrap_or_default(),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.failure().is_none()
    }

    pub fn text(&self) -> Option<&str> {
        self.body.as_ref().and_then(OutcomeBody::as_text)
    }

    pub fn structured(&self) -> Option<&Value> {
        self.body.as_ref().and_then(OutcomeBody::as_structured)
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode a reply body into normalized outcomes without raising CLI errors.
///
/// Fails with [`Error::Decode`] when the body is not valid XML/JSON or the
/// `ins_api.outputs.output` path is missing.
pub fn decode(body: &str, format: OutputFormat) -> Result<Vec<CliOutcome>, Error> {
    let value = match format {
        OutputFormat::Xml => xml::to_value(body).map_err(|e| attach_body(e, body))?,
        OutputFormat::Json => serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("invalid JSON: {e}"),
            body: body.to_owned(),
        })?,
    };

    let envelope: Envelope = serde_json::from_value(value).map_err(|e| Error::Decode {
        message: format!("unexpected ins_api shape: {e}"),
        body: body.to_owned(),
    })?;

    let outcomes: Vec<CliOutcome> = envelope
        .ins_api
        .outputs
        .output
        .into_vec()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| CliOutcome {
            index,
            input: raw.input,
            code: raw.code,
            msg: raw.msg,
            body: OutcomeBody::from_value(raw.body),
            clierror: raw.clierror,
        })
        .collect();

    trace!(count = outcomes.len(), "decoded NX-API outputs");
    Ok(outcomes)
}

/// Raise the first CLI failure in submission order, or pass the outcomes on.
pub fn check(outcomes: Vec<CliOutcome>) -> Result<Vec<CliOutcome>, Error> {
    let batch_len = outcomes.len();
    if let Some((index, failure)) = outcomes
        .iter()
        .find_map(|o| o.failure().map(|f| (o.index, f)))
    {
        return Err(Error::Cli {
            code: failure.code,
            message: failure.message,
            index,
            batch_len,
        });
    }
    Ok(outcomes)
}

/// [`decode`] followed by [`check`].
pub fn parse(body: &str, format: OutputFormat) -> Result<Vec<CliOutcome>, Error> {
    check(decode(body, format)?)
}

fn attach_body(err: Error, body: &str) -> Error {
    match err {
        Error::Decode { message, .. } => Error::Decode {
            message,
            body: body.to_owned(),
        },
        other => other,
    }
}

// ── Field helpers ────────────────────────────────────────────────────

fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(string_like(deserializer)?.unwrap_or_default()))
}
