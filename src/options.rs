//! Derivation options.
//!
//! Threaded by reference through every recursive call and never mutated.
//! Loadable from JSON (camelCase keys, every field optional):
//!
//! ```json
//! {
//!   "parseNotKeyword": true,
//!   "references": { "https://example.com/address.json": { "type": "object" } },
//!   "deserialize": [{ "pattern": { "type": "string", "format": "date-time" }, "output": "Date" }]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeriveOptions {
    /// Honor `not` (ignored otherwise).
    pub parse_not_keyword: bool,
    /// Honor `if`/`then`/`else` (ignored otherwise).
    pub parse_if_then_else_keywords: bool,
    /// Properties carrying a `default` stay optional instead of being
    /// treated as always present.
    pub keep_defaulted_properties_optional: bool,
    /// Document `#/...` references resolve against. `null` means "the node
    /// handed to the top-level derive".
    pub root_schema: Value,
    /// External documents by id, for `id#/path` references.
    pub references: IndexMap<String, Value>,
    pub deserialize: Deserialization,
}

/// `false` or a list of patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDeserialization", into = "RawDeserialization")]
pub enum Deserialization {
    #[default]
    Disabled,
    Patterns(Vec<DeserializationPattern>),
}

/// A schema fragment and the opaque type that overrides whatever the
/// schema derives to when the fragment matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeserializationPattern {
    pub pattern: Value,
    pub output: String,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDeserialization {
    Flag(bool),
    Patterns(Vec<DeserializationPattern>),
}

impl TryFrom<RawDeserialization> for Deserialization {
    type Error = String;

    fn try_from(raw: RawDeserialization) -> Result<Self, Self::Error> {
        match raw {
            RawDeserialization::Flag(false) => Ok(Deserialization::Disabled),
            RawDeserialization::Flag(true) => {
                Err("`deserialize` must be `false` or a list of patterns".to_string())
            }
            RawDeserialization::Patterns(p) => Ok(Deserialization::Patterns(p)),
        }
    }
}

impl From<Deserialization> for RawDeserialization {
    fn from(d: Deserialization) -> Self {
        match d {
            Deserialization::Disabled => RawDeserialization::Flag(false),
            Deserialization::Patterns(p) => RawDeserialization::Patterns(p),
        }
    }
}

impl DeriveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        crate::path_de::from_str_with_path(src)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        crate::path_de::from_slice_with_path(bytes)
    }

    pub fn parse_not(mut self, on: bool) -> Self {
        self.parse_not_keyword = on;
        self
    }

    pub fn parse_if_then_else(mut self, on: bool) -> Self {
        self.parse_if_then_else_keywords = on;
        self
    }

    pub fn keep_defaulted_optional(mut self, on: bool) -> Self {
        self.keep_defaulted_properties_optional = on;
        self
    }

    pub fn with_root_schema(mut self, root: Value) -> Self {
        self.root_schema = root;
        self
    }

    pub fn with_reference(mut self, id: impl Into<String>, schema: Value) -> Self {
        self.references.insert(id.into(), schema);
        self
    }

    pub fn with_deserialize(mut self, patterns: Vec<DeserializationPattern>) -> Self {
        self.deserialize = Deserialization::Patterns(patterns);
        self
    }

    /// The active patterns; `None` when disabled or empty.
    pub fn deserialize_patterns(&self) -> Option<&[DeserializationPattern]> {
        match &self.deserialize {
            Deserialization::Patterns(p) if !p.is_empty() => Some(p),
            _ => None,
        }
    }
}
