//! Option-style fields.
//!
//! When OPNsense returns an object for editing, option fields come back as a
//! map of every allowed key with a `selected` flag:
//!
//! ```json
//! {"http": {"value": "HTTP (Layer 7)", "selected": 1},
//!  "tcp":  {"value": "TCP (Layer 4)",  "selected": 0}}
//! ```
//!
//! On writes the same fields are sent as plain strings. [`SelectedValue`] and
//! [`SelectedList`] accept either shape and always write the plain one.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Wire shape for multi-valued fields on writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListEncoding {
    /// `"h2,http11"`
    #[default]
    CommaJoined,
    /// `["h2","http11"]`
    Sequence,
}

impl ListEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListEncoding::CommaJoined => "comma",
            ListEncoding::Sequence => "sequence",
        }
    }
}

impl fmt::Display for ListEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comma" => Ok(ListEncoding::CommaJoined),
            "sequence" => Ok(ListEncoding::Sequence),
            other => Err(format!(
                "unknown list encoding {:?}, expected \"comma\" or \"sequence\"",
                other
            )),
        }
    }
}

/// A single-choice option field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedValue(String);

impl SelectedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn render(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SelectedValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for SelectedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SelectedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = match RawOption::deserialize(deserializer)? {
            RawOption::Null => String::new(),
            RawOption::Text(s) => s,
            RawOption::Items(items) => items.into_iter().next().unwrap_or_default(),
            RawOption::Options(options) => selected_keys(options)
                .into_iter()
                .next()
                .unwrap_or_default(),
        };
        Ok(Self(value))
    }
}

/// A multi-choice option field. Equality ignores the wire encoding.
#[derive(Debug, Clone, Default)]
pub struct SelectedList {
    items: Vec<String>,
    encoding: ListEncoding,
}

impl SelectedList {
    pub fn new(items: Vec<String>, encoding: ListEncoding) -> Self {
        Self { items, encoding }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn encoding(&self) -> ListEncoding {
        self.encoding
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PartialEq for SelectedList {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Eq for SelectedList {}

impl Serialize for SelectedList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.encoding {
            ListEncoding::CommaJoined => serializer.serialize_str(&self.items.join(",")),
            ListEncoding::Sequence => self.items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SelectedList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = match RawOption::deserialize(deserializer)? {
            RawOption::Null => SelectedList::default(),
            RawOption::Text(s) => SelectedList::new(
                s.split(',')
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
                ListEncoding::CommaJoined,
            ),
            RawOption::Items(items) => SelectedList::new(items, ListEncoding::Sequence),
            RawOption::Options(options) => {
                SelectedList::new(selected_keys(options), ListEncoding::CommaJoined)
            }
        };
        Ok(list)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Null,
    Text(String),
    Items(Vec<String>),
    Options(BTreeMap<String, OptionEntry>),
}

#[derive(Deserialize)]
struct OptionEntry {
    #[serde(default)]
    selected: SelectedFlag,
}

/// `selected` shows up as 0/1, true/false or "0"/"1" depending on the
/// controller.
#[derive(Default)]
struct SelectedFlag(bool);

impl<'de> Deserialize<'de> for SelectedFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum BoolIntOrString {
            Bool(bool),
            Int(i64),
            Str(String),
        }

        Ok(match BoolIntOrString::deserialize(deserializer)? {
            BoolIntOrString::Bool(b) => SelectedFlag(b),
            BoolIntOrString::Int(i) => SelectedFlag(i != 0),
            BoolIntOrString::Str(s) => SelectedFlag(s == "1" || s == "true"),
        })
    }
}

fn selected_keys(options: BTreeMap<String, OptionEntry>) -> Vec<String> {
    options
        .into_iter()
        .filter(|(key, entry)| entry.selected.0 && !key.is_empty())
        .map(|(key, _)| key)
        .collect()
}
