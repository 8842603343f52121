// src/meta.rs
//! Meta-type algebra.
//!
//! A `MetaType` describes the set of JSON values a schema permits. The four
//! structural shapes are `Any`, `Never`, `Union` and `Intersect`; the remaining
//! variants are leaves produced by the keyword collaborators in `crate::leaf`.
//!
//! Laws applied by the smart constructors (and nothing else):
//! - `Intersect([Any, X]) = X`, `Intersect([Never, X]) = Never`
//! - `Union([Never, X]) = X`, `Union([Any, X]) = Any`
//! - a singleton union/intersection collapses to its member
//!
//! Member order is construction order. Deeper simplification lives in
//! [`narrow`] and is never applied implicitly.
pub mod narrow;

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ------------------------------- Types ----------------------------------- //

/// Scalar kinds that are not literals. `integer` folds into `Number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaType {
    /// Every JSON value.
    Any,
    /// No JSON value.
    Never,
    /// Exactly one literal (`null` included).
    Const(Value),
    /// One of the listed literals, in declaration order.
    Enum(Vec<Value>),
    Primitive(Primitive),
    /// Homogeneous list.
    Array(Box<MetaType>),
    /// Positional list. Elements at index `>= min_items` are optional,
    /// anything past `prefix` must match `rest` (`Never` = closed).
    Tuple {
        prefix: Vec<MetaType>,
        #[serde(rename = "minItems")]
        min_items: usize,
        rest: Box<MetaType>,
    },
    /// Keys not listed in `properties` must match `rest` (`Never` = closed).
    Object {
        properties: IndexMap<String, MetaType>,
        required: Vec<String>,
        rest: Box<MetaType>,
    },
    /// Values of `source` that are not values of `excluded`.
    Exclude {
        source: Box<MetaType>,
        excluded: Box<MetaType>,
    },
    /// Opaque override type named by a deserialize pattern.
    Deserialized(String),
    Union(Vec<MetaType>),
    Intersect(Vec<MetaType>),
}

// ---------------------------- Constructors -------------------------------- //

impl MetaType {
    pub fn union<I>(members: I) -> Self
    where
        I: IntoIterator<Item = MetaType>,
    {
        let mut out = Vec::new();
        for member in members {
            match member {
                MetaType::Any => return MetaType::Any,
                MetaType::Never => {}
                other => out.push(other),
            }
        }
        collapse(out, MetaType::Never, MetaType::Union)
    }

    pub fn intersect<I>(members: I) -> Self
    where
        I: IntoIterator<Item = MetaType>,
    {
        let mut out = Vec::new();
        for member in members {
            match member {
                MetaType::Never => return MetaType::Never,
                MetaType::Any => {}
                other => out.push(other),
            }
        }
        collapse(out, MetaType::Any, MetaType::Intersect)
    }

    /// `Const`, `Enum` or `Never` depending on how many literals are left.
    pub fn literals(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => MetaType::Never,
            1 => MetaType::Const(values.remove(0)),
            _ => MetaType::Enum(values),
        }
    }

    pub fn exclude(source: MetaType, excluded: MetaType) -> Self {
        MetaType::Exclude { source: Box::new(source), excluded: Box::new(excluded) }
    }

    pub fn null() -> Self {
        MetaType::Const(Value::Null)
    }

    /// An object with no declared properties accepting any extra key.
    pub fn any_object() -> Self {
        MetaType::Object {
            properties: IndexMap::new(),
            required: Vec::new(),
            rest: Box::new(MetaType::Any),
        }
    }

    /// `Any` spelled out as the union of every JSON kind. Used as the
    /// source of an exclusion so the excluded part has something to remove.
    pub fn json_kinds() -> Self {
        MetaType::Union(vec![
            MetaType::null(),
            MetaType::Primitive(Primitive::Boolean),
            MetaType::Primitive(Primitive::Number),
            MetaType::Primitive(Primitive::String),
            MetaType::Array(Box::new(MetaType::Any)),
            MetaType::any_object(),
        ])
    }

    pub fn is_any(&self) -> bool {
        matches!(self, MetaType::Any)
    }

    pub fn is_never(&self) -> bool {
        matches!(self, MetaType::Never)
    }
}

fn collapse(mut members: Vec<MetaType>, empty: MetaType, wrap: fn(Vec<MetaType>) -> MetaType) -> MetaType {
    match members.len() {
        0 => empty,
        1 => members.remove(0),
        _ => wrap(members),
    }
}

// ------------------------------ Membership -------------------------------- //

impl Primitive {
    pub fn admits(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Primitive::String, Value::String(_))
                | (Primitive::Number, Value::Number(_))
                | (Primitive::Boolean, Value::Bool(_))
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }
}

impl MetaType {
    /// Literal membership: `Some(true/false)` when decidable from the
    /// meta-type alone, `None` when an opaque part (a deserialized override)
    /// gets in the way.
    pub fn accepts(&self, value: &Value) -> Option<bool> {
        match self {
            MetaType::Any => Some(true),
            MetaType::Never => Some(false),
            MetaType::Const(c) => Some(c == value),
            MetaType::Enum(values) => Some(values.contains(value)),
            MetaType::Primitive(p) => Some(p.admits(value)),
            MetaType::Array(items) => match value {
                Value::Array(xs) => all3(xs.iter().map(|x| items.accepts(x))),
                _ => Some(false),
            },
            MetaType::Tuple { prefix, min_items, rest } => match value {
                Value::Array(xs) if xs.len() >= *min_items => all3(xs.iter().enumerate().map(|(i, x)| {
                    prefix.get(i).unwrap_or(&**rest).accepts(x)
                })),
                _ => Some(false),
            },
            MetaType::Object { properties, required, rest } => match value {
                Value::Object(map) => {
                    if required.iter().any(|k| !map.contains_key(k)) {
                        return Some(false);
                    }
                    all3(map.iter().map(|(k, v)| properties.get(k).unwrap_or(&**rest).accepts(v)))
                }
                _ => Some(false),
            },
            MetaType::Exclude { source, excluded } => {
                match (source.accepts(value), excluded.accepts(value)) {
                    (Some(false), _) | (_, Some(true)) => Some(false),
                    (Some(true), Some(false)) => Some(true),
                    _ => None,
                }
            }
            MetaType::Deserialized(_) => None,
            MetaType::Union(members) => any3(members.iter().map(|m| m.accepts(value))),
            MetaType::Intersect(members) => all3(members.iter().map(|m| m.accepts(value))),
        }
    }
}

fn all3(it: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut decided = true;
    for r in it {
        match r {
            Some(false) => return Some(false),
            Some(true) => {}
            None => decided = false,
        }
    }
    if decided { Some(true) } else { None }
}

fn any3(it: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut decided = true;
    for r in it {
        match r {
            Some(true) => return Some(true),
            Some(false) => {}
            None => decided = false,
        }
    }
    if decided { Some(false) } else { None }
}

// ------------------------------- Display ---------------------------------- //

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaType::Any => f.write_str("any"),
            MetaType::Never => f.write_str("never"),
            MetaType::Const(v) => write!(f, "{v}"),
            MetaType::Enum(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", parts.join(" | "))
            }
            MetaType::Primitive(p) => f.write_str(p.name()),
            MetaType::Array(items) => write!(f, "{items}[]"),
            MetaType::Tuple { prefix, min_items, rest } => {
                let mut parts: Vec<String> = prefix
                    .iter()
                    .enumerate()
                    .map(|(i, t)| if i < *min_items { t.to_string() } else { format!("{t}?") })
                    .collect();
                if !rest.is_never() {
                    parts.push(format!("...{rest}[]"));
                }
                write!(f, "[{}]", parts.join(", "))
            }
            MetaType::Object { properties, required, rest } => {
                let mut parts: Vec<String> = properties
                    .iter()
                    .map(|(k, t)| {
                        let opt = if required.contains(k) { "" } else { "?" };
                        format!("{k}{opt}: {t}")
                    })
                    .collect();
                for k in required.iter().filter(|k| !properties.contains_key(*k)) {
                    parts.push(format!("{k}: {rest}"));
                }
                if !rest.is_never() {
                    parts.push(format!("[key: string]: {rest}"));
                }
                if parts.is_empty() {
                    f.write_str("{}")
                } else {
                    write!(f, "{{ {} }}", parts.join("; "))
                }
            }
            MetaType::Exclude { source, excluded } => write!(f, "Exclude<{source}, {excluded}>"),
            MetaType::Deserialized(name) => f.write_str(name),
            MetaType::Union(members) => write_joined(f, members, " | "),
            MetaType::Intersect(members) => write_joined(f, members, " & "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, members: &[MetaType], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, m) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{m}")?;
    }
    f.write_str(")")
}

// ------------------------------- Tests ------------------------------------ //
