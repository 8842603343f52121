//! `$ref` resolution.
//!
//! `#/path` walks the reference root; `id#/path` (or a bare `id`) walks the
//! document registered under `id` in the options, falling back to `id`
//! resolved against the directory of the root schema's `$id`.

use serde_json::Value;

use super::Deriver;
use crate::error::{DeriveError, Result};
use crate::merge::{merge, without};
use crate::meta::MetaType;
use crate::pointer::{deep_get, split_path};

/// Keywords that only identify the referencing node. A node carrying
/// nothing else derives to exactly its target.
const REFERENCE_KEYWORDS: &[&str] = &["$ref", "$id", "$schema", "$comment"];

pub fn derive_reference(d: &Deriver<'_>, node: &Value, reference: &Value) -> Result<MetaType> {
    let Some(reference) = reference.as_str() else {
        return Err(DeriveError::InvalidReference { found: reference.to_string() });
    };
    let (id, path) = reference.split_once('#').unwrap_or((reference, ""));
    let source = if id.is_empty() { d.root() } else { external_source(d, reference, id)? };
    resolve_reference(d, node, reference, source, path)
}

/// Derive the node at `path` inside `source`, intersected with whatever
/// else the referencing `node` constrains.
pub fn resolve_reference(
    d: &Deriver<'_>,
    node: &Value,
    reference: &str,
    source: &Value,
    path: &str,
) -> Result<MetaType> {
    let target = deep_get(source, &split_path(path)).ok_or_else(|| DeriveError::UnresolvedReference {
        reference: reference.to_string(),
        path: path.to_string(),
    })?;
    let parsed_target = d.derive(target)?;

    if !has_mergeable_keys(node) {
        tracing::debug!(reference, "reference resolved (fast path)");
        return Ok(parsed_target);
    }
    tracing::debug!(reference, "reference resolved, merging referencing node");
    let rest = without(node, &["$ref"]);
    Ok(MetaType::intersect([parsed_target, d.derive(&merge(target, &rest))?]))
}

fn has_mergeable_keys(node: &Value) -> bool {
    match node {
        Value::Object(map) => map.keys().any(|k| !REFERENCE_KEYWORDS.contains(&k.as_str())),
        _ => false,
    }
}

fn external_source<'a>(d: &Deriver<'a>, reference: &str, id: &str) -> Result<&'a Value> {
    let references = &d.options().references;
    if let Some(source) = references.get(id) {
        return Ok(source);
    }
    if let Some(dir) = root_directory(d.root()) {
        if let Some(source) = references.get(&format!("{dir}{id}")) {
            return Ok(source);
        }
    }
    Err(DeriveError::UnknownReferenceSource {
        reference: reference.to_string(),
        id: id.to_string(),
    })
}

/// `https://x.dev/schemas/root.json` -> `https://x.dev/schemas/`
fn root_directory(root: &Value) -> Option<&str> {
    let id = root.get("$id")?.as_str()?;
    let cut = id.rfind('/')?;
    Some(&id[..=cut])
}

#[cfg(test)]
mod tests {
    use crate::dispatch::derive;
    use crate::error::DeriveError;
    use crate::meta::{MetaType, Primitive};
    use crate::options::DeriveOptions;
    use serde_json::json;

    fn number() -> MetaType {
        MetaType::Primitive(Primitive::Number)
    }

    #[test]
    fn fast_path_returns_the_target_unwrapped() {
        let options = DeriveOptions::new().with_root_schema(json!({"foo": {"type": "number"}}));
        let t = derive(&json!({"$ref": "#/foo"}), &options).unwrap();
        assert_eq!(t, number());
        let t = derive(&json!({"$ref": "#/foo", "$comment": "n", "$id": "x"}), &options).unwrap();
        assert_eq!(t, number());
    }

    #[test]
    fn extra_constraints_intersect_with_the_target() {
        let options = DeriveOptions::new().with_root_schema(json!({"foo": {"type": "number"}}));
        let t = derive(&json!({"$ref": "#/foo", "minimum": 5}), &options).unwrap();
        let target = derive(&json!({"type": "number"}), &options).unwrap();
        let merged = derive(&json!({"type": "number", "minimum": 5}), &options).unwrap();
        assert_eq!(t, MetaType::Intersect(vec![target, merged]));
    }

    #[test]
    fn definitions_inside_the_schema_itself() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"$ref": "#/definitions/name"},
                "b": {"$ref": "#/definitions/name", "enum": ["x", 1]}
            },
            "definitions": {"name": {"type": "string"}}
        });
        let t = derive(&schema, &DeriveOptions::default()).unwrap().narrow();
        let MetaType::Object { properties, .. } = t else {
            panic!("expected an object");
        };
        assert_eq!(properties["a"], MetaType::Primitive(Primitive::String));
        assert_eq!(properties["b"], MetaType::Const(json!("x")));
    }

    #[test]
    fn chained_references() {
        let schema = json!({
            "$ref": "#/$defs/a",
            "$defs": {"a": {"$ref": "#/$defs/b"}, "b": {"const": 3}}
        });
        // the root carries `$defs`, so it goes through the merge path
        let t = derive(&schema, &DeriveOptions::default()).unwrap();
        assert_eq!(t.narrow(), MetaType::Const(json!(3)));
    }

    #[test]
    fn external_references_by_id() {
        let options = DeriveOptions::new()
            .with_reference("https://ex.dev/address.json", json!({
                "$defs": {"zip": {"type": "string"}},
                "type": "object"
            }));
        let t = derive(&json!({"$ref": "https://ex.dev/address.json#/$defs/zip"}), &options).unwrap();
        assert_eq!(t, MetaType::Primitive(Primitive::String));
        let t = derive(&json!({"$ref": "https://ex.dev/address.json"}), &options).unwrap();
        assert!(matches!(t, MetaType::Object { .. }));
    }

    #[test]
    fn external_reference_relative_to_root_id() {
        let options = DeriveOptions::new()
            .with_reference("https://ex.dev/schemas/n.json", json!({"type": "number"}));
        let schema = json!({
            "$id": "https://ex.dev/schemas/root.json",
            "type": "object",
            "properties": {"n": {"$ref": "n.json"}}
        });
        let t = derive(&schema, &options).unwrap();
        let MetaType::Object { properties, .. } = t else {
            panic!("expected an object");
        };
        assert_eq!(properties["n"], number());
    }

    #[test]
    fn unresolvable_path_is_an_error() {
        let err = derive(&json!({"$ref": "#/nope"}), &DeriveOptions::default()).unwrap_err();
        assert_eq!(
            err,
            DeriveError::UnresolvedReference { reference: "#/nope".into(), path: "/nope".into() }
        );
    }

    #[test]
    fn unknown_source_is_an_error() {
        let err = derive(&json!({"$ref": "other.json#/a"}), &DeriveOptions::default()).unwrap_err();
        assert!(matches!(err, DeriveError::UnknownReferenceSource { ref id, .. } if id == "other.json"));
    }

    #[test]
    fn non_string_reference_is_an_error() {
        let err = derive(&json!({"$ref": 3}), &DeriveOptions::default()).unwrap_err();
        assert_eq!(err, DeriveError::InvalidReference { found: "3".into() });
    }

    #[test]
    fn errors_surface_through_compositions() {
        let err = derive(&json!({"anyOf": [{"type": "string"}, {"$ref": "#/missing"}]}), &DeriveOptions::default());
        assert!(err.is_err());
    }
}
