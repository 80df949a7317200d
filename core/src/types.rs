//! Domain types for list entries.
//!
//! # Design
//! `EntryType` is a closed enum so invalid kinds cannot reach request
//! construction. String input is still accepted at the API edge through
//! `TryFrom<&str>`, which reports `MalError::InvalidArgument`.
//!
//! `EntryFields` keeps insertion order so the XML body is deterministic.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::MalError;
use crate::xml::XmlNode;

/// The two kinds of list the service tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Anime,
    Manga,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::Anime => "anime",
            EntryType::Manga => "manga",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = MalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime" => Ok(EntryType::Anime),
            "manga" => Ok(EntryType::Manga),
            other => Err(MalError::InvalidArgument(format!(
                "invalid entry type {other:?}, expected \"anime\" or \"manga\""
            ))),
        }
    }
}

impl TryFrom<&str> for EntryType {
    type Error = MalError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for EntryType {
    type Error = MalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// List status codes understood by the add/update endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Watching (anime) or reading (manga).
    InProgress,
    Completed,
    OnHold,
    Dropped,
    /// Plan to watch (anime) or plan to read (manga).
    Planned,
}

impl EntryStatus {
    pub fn code(self) -> i64 {
        match self {
            EntryStatus::InProgress => 1,
            EntryStatus::Completed => 2,
            EntryStatus::OnHold => 3,
            EntryStatus::Dropped => 4,
            EntryStatus::Planned => 6,
        }
    }
}

/// A scalar field value in an outbound entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! field_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(value: $t) -> Self {
                FieldValue::Int(i64::from(value))
            }
        })*
    };
}

field_value_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<EntryStatus> for FieldValue {
    fn from(value: EntryStatus) -> Self {
        FieldValue::Int(value.code())
    }
}

/// Ordered field name to value mapping sent as the `<entry>` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryFields(IndexMap<String, FieldValue>);

impl EntryFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a field. A replaced field keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EntryFields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The authenticated account, as returned by credential verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserProfile(XmlNode);

impl UserProfile {
    pub fn new(node: XmlNode) -> Self {
        Self(node)
    }

    pub fn id(&self) -> Option<&str> {
        self.field("id")
    }

    pub fn username(&self) -> Option<&str> {
        self.field("username")
    }

    /// Text content of a direct child field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(XmlNode::as_text)
    }

    pub fn node(&self) -> &XmlNode {
        &self.0
    }

    pub fn into_node(self) -> XmlNode {
        self.0
    }
}
