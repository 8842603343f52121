//! `not`: whatever the rest of the node admits, minus what the negated
//! schema (merged into that rest) admits.

use serde_json::Value;

use super::exclusion_source;
use crate::dispatch::Deriver;
use crate::error::Result;
use crate::merge::{merge, without};
use crate::meta::MetaType;

pub fn derive_not(d: &Deriver<'_>, node: &Value) -> Result<MetaType> {
    let root = without(node, &["not"]);
    let source = exclusion_source(d.derive(&root)?);
    let excluded = match node.get("not") {
        Some(negated) => d.derive(&merge(&root, negated))?,
        None => MetaType::Never,
    };
    Ok(MetaType::exclude(source, excluded))
}
