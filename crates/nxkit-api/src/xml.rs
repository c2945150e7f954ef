// XML → JSON value conversion
//
// NX-API mirrors the same envelope in XML and JSON. Converting XML into a
// `serde_json::Value` lets one set of serde models decode both. Mapping:
//
//   <a>text</a>          → "a": "text"
//   <a/> or <a></a>      → "a": null
//   <a><b>1</b></a>      → "a": { "b": "1" }
//   repeated <b> siblings → "b": [ ... ]
//   attributes           → "@name": "value"
//   text mixed w/ children → "#text": "..."
//
// Text is trimmed. A single `ROW_*` child stays an object; callers that
// walk tables must accept both shapes.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::Error;

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, Error> {
        let name = element_name(start)?;
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| decode_error(format!("bad attribute: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| decode_error(format!("attribute name is not UTF-8: {e}")))?;
            let value = attr
                .unescape_value()
                .map_err(|e| decode_error(format!("bad attribute value: {e}")))?;
            children.insert(format!("@{key}"), Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_owned())
            }
        } else {
            let mut children = self.children;
            if !text.is_empty() {
                children.insert("#text".into(), Value::String(text.to_owned()));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// Parse an XML document into a JSON value rooted at the document element.
pub fn to_value(xml: &str) -> Result<Value, Error> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Frame::open(&start)?),
            Ok(Event::Empty(start)) => {
                let (name, value) = Frame::open(&start)?.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Ok(Event::End(_)) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| decode_error("closing tag without opening tag"))?;
                let (name, value) = frame.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Ok(Event::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    let text = text
                        .unescape()
                        .map_err(|e| decode_error(format!("bad text content: {e}")))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(top) = stack.last_mut() {
                    let raw = data.into_inner();
                    top.text.push_str(&String::from_utf8_lossy(&raw));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(decode_error(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !stack.is_empty() {
        return Err(decode_error("unexpected end of document"));
    }
    root.ok_or_else(|| decode_error("document has no root element"))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<Value>,
    name: String,
    value: Value,
) -> Result<(), Error> {
    let Some(parent) = stack.last_mut() else {
        if root.is_some() {
            return Err(decode_error("multiple root elements"));
        }
        let mut doc = Map::new();
        doc.insert(name, value);
        *root = Some(Value::Object(doc));
        return Ok(());
    };
    match parent.children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.children.insert(name, value);
        }
    }
    Ok(())
}

fn element_name(start: &BytesStart<'_>) -> Result<String, Error> {
    std::str::from_utf8(start.name().as_ref())
        .map(String::from)
        .map_err(|e| decode_error(format!("element name is not UTF-8: {e}")))
}

fn decode_error(message: impl Into<String>) -> Error {
    Error::Decode {
        message: message.into(),
        body: String::new(),
    }
}
