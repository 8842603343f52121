//! Deserialize overrides.
//!
//! A pattern matches a node when it is a structural subset of it: every
//! key of an object pattern is present in the node with a matching value,
//! recursively. Anything that is not an object must be equal.

use serde_json::Value;

use crate::meta::MetaType;
use crate::options::DeserializationPattern;

/// Intersection of `Deserialized(output)` for every matching pattern, in
/// pattern order; `Any` when none match.
pub fn override_for(node: &Value, patterns: &[DeserializationPattern]) -> MetaType {
    let matched: Vec<MetaType> = patterns
        .iter()
        .filter(|p| is_subset(&p.pattern, node))
        .map(|p| MetaType::Deserialized(p.output.clone()))
        .collect();
    if matched.is_empty() {
        return MetaType::Any;
    }
    tracing::trace!(count = matched.len(), "deserialize patterns matched");
    MetaType::intersect(matched)
}

fn is_subset(pattern: &Value, node: &Value) -> bool {
    match (pattern, node) {
        (Value::Object(p), Value::Object(n)) => p
            .iter()
            .all(|(k, v)| n.get(k).is_some_and(|nv| is_subset(v, nv))),
        (pattern, node) => pattern == node,
    }
}
