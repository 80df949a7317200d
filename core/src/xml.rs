//! XML codec for entry payloads and service responses.
//!
//! # Design
//! The rest of the crate never touches raw XML. Outbound entries are written
//! as a flat `<entry>` document; inbound documents are decoded into an
//! `XmlNode` tree where an element only becomes a `List` when its name
//! actually repeats among its siblings.
//!
//! Decoding rules:
//! - an element with no attributes and no child elements is `Text`;
//! - otherwise it is a `Map`, with attributes under `$` and any
//!   non-whitespace text under `_`;
//! - leaf text is kept verbatim, surrounding whitespace included;
//! - the returned tree is `{root_name: root_value}`.

use std::borrow::Cow;

use indexmap::IndexMap;
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;

use crate::error::{MalError, Result};
use crate::types::EntryFields;

/// Root element name of outbound entry payloads.
pub const ENTRY_ROOT: &str = "entry";

/// Key under which element attributes are collected.
pub const ATTRIBUTES_KEY: &str = "$";
/// Key under which text content is stored when an element also has children or attributes.
pub const TEXT_KEY: &str = "_";

/// A decoded XML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum XmlNode {
    Text(String),
    Map(IndexMap<String, XmlNode>),
    List(Vec<XmlNode>),
}

impl XmlNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlNode::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, XmlNode>> {
        match self {
            XmlNode::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[XmlNode]> {
        match self {
            XmlNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Child lookup on a `Map`; `None` for any other variant.
    pub fn get(&self, key: &str) -> Option<&XmlNode> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Text of a direct child, e.g. `entry.text_of("title")`.
    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(XmlNode::as_text)
    }

    /// Removes and returns a child from a `Map`.
    pub fn take(&mut self, key: &str) -> Option<XmlNode> {
        match self {
            XmlNode::Map(map) => map.shift_remove(key),
            _ => None,
        }
    }

    /// A `List` yields its items, anything else becomes a one-element sequence.
    pub fn into_list(self) -> Vec<XmlNode> {
        match self {
            XmlNode::List(items) => items,
            other => vec![other],
        }
    }
}

/// Serializes `fields` as `<entry><key>value</key>...</entry>` without
/// declaration or indentation.
pub fn encode_entry(fields: &EntryFields) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Start(BytesStart::new(ENTRY_ROOT)))?;
    for (key, value) in fields.iter() {
        if !is_valid_name(key) {
            return Err(MalError::InvalidArgument(format!("{key:?} is not a valid field name")));
        }
        let text = value.to_string();
        write(&mut writer, Event::Start(BytesStart::new(key)))?;
        write(&mut writer, Event::Text(BytesText::new(&text)))?;
        write(&mut writer, Event::End(BytesEnd::new(key)))?;
    }
    write(&mut writer, Event::End(BytesEnd::new(ENTRY_ROOT)))?;
    String::from_utf8(writer.into_inner()).map_err(|e| MalError::Serialization(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| MalError::Serialization(e.to_string()))
}

/// Parses a complete XML document into `{root_name: value}`.
pub fn decode(xml: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, XmlNode)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            MalError::Parse(format!("XML error at position {}: {e}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(ref e) => {
                ensure_single_root(&root, &stack)?;
                stack.push(Frame::open(e)?);
            }
            Event::Empty(ref e) => {
                ensure_single_root(&root, &stack)?;
                close(Frame::open(e)?, &mut stack, &mut root);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| MalError::Parse("unexpected closing tag".to_string()))?;
                close(frame, &mut stack, &mut root);
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape_with(resolve_entity)
                    .map_err(|e| MalError::Parse(e.to_string()))?;
                append_text(&mut stack, text)?;
            }
            Event::CData(t) => {
                let raw = t.into_inner();
                append_text(&mut stack, String::from_utf8_lossy(&raw))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MalError::Parse(format!("unexpected end of document inside <{}>", open.name)));
    }
    let (name, node) = root.ok_or_else(|| MalError::Parse("document has no root element".to_string()))?;
    Ok(XmlNode::Map(IndexMap::from([(name, node)])))
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_predefined_entity(name).or_else(|| resolve_html5_entity(name))
}

fn ensure_single_root(root: &Option<(String, XmlNode)>, stack: &[Frame]) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(MalError::Parse("document has more than one root element".to_string()));
    }
    Ok(())
}

fn append_text(stack: &mut [Frame], text: Cow<'_, str>) -> Result<()> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(&text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(MalError::Parse("text outside of the root element".to_string())),
    }
}

fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<(String, XmlNode)>) {
    let (name, node) = frame.finish();
    match stack.last_mut() {
        Some(parent) => push_child(&mut parent.children, name, node),
        None => *root = Some((name, node)),
    }
}

/// Repeated names collapse into a `List` in document order.
fn push_child(children: &mut IndexMap<String, XmlNode>, name: String, node: XmlNode) {
    match children.get_mut(&name) {
        Some(XmlNode::List(items)) => items.push(node),
        Some(existing) => {
            let first = std::mem::replace(existing, XmlNode::List(Vec::new()));
            *existing = XmlNode::List(vec![first, node]);
        }
        None => {
            children.insert(name, node);
        }
    }
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    attributes: IndexMap<String, XmlNode>,
    children: IndexMap<String, XmlNode>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MalError::Parse(format!("bad attribute in <{name}>: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| MalError::Parse(format!("bad attribute value in <{name}>: {e}")))?;
            attributes.insert(key, XmlNode::Text(value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        })
    }

    fn finish(self) -> (String, XmlNode) {
        if self.attributes.is_empty() && self.children.is_empty() {
            return (self.name, XmlNode::Text(self.text));
        }
        let mut map = IndexMap::new();
        if !self.attributes.is_empty() {
            map.insert(ATTRIBUTES_KEY.to_string(), XmlNode::Map(self.attributes));
        }
        map.extend(self.children);
        if !self.text.trim().is_empty() {
            map.insert(TEXT_KEY.to_string(), XmlNode::Text(self.text));
        }
        (self.name, XmlNode::Map(map))
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
