//! Derive the meta-type of a JSON Schema.
//!
//! A meta-type is a closed algebra (`Any`, `Never`, literals, primitives,
//! arrays, tuples, objects, exclusions, deserialized overrides, unions and
//! intersections) describing the set of JSON values a schema admits. The
//! derivation is structural: smart constructors only apply the identity and
//! absorption laws, everything else is left to [`MetaType::narrow`].
//!
//! ```
//! use json_metatype::{derive, DeriveOptions};
//! use serde_json::json;
//!
//! let schema = json!({"allOf": [{"type": "number"}, {"enum": [1, 2, "foo"]}]});
//! let t = derive(&schema, &DeriveOptions::default()).unwrap();
//! assert_eq!(t.narrow().to_string(), "(1 | 2)");
//! ```
pub mod dispatch;
pub mod error;
pub mod leaf;
pub mod merge;
pub mod meta;
pub mod options;
pub mod path_de;
pub mod pointer;
pub mod shape;

pub use dispatch::{derive, Deriver};
pub use error::{ConfigError, DeriveError};
pub use meta::{MetaType, Primitive};
pub use options::{DeriveOptions, Deserialization, DeserializationPattern};
