//! Structural merge of two schema nodes.
//!
//! `merge(root, sub)` yields a node carrying the constraints of both:
//! - keys of `sub` override keys of `root`
//! - `required` lists are unioned (root order first, duplicates dropped)
//! - `properties` maps are unioned, `sub` entries override
//! - `additionalItems` is dropped when the merged `items` is not a list,
//!   since it is meaningless there
//!
//! Boolean schemas: `false` on either side wins, `true` is neutral.

use serde_json::{Map, Value};

pub fn merge(root: &Value, sub: &Value) -> Value {
    let (root_map, sub_map) = match (root, sub) {
        (Value::Bool(false), _) | (_, Value::Bool(false)) => return Value::Bool(false),
        (Value::Object(r), Value::Object(s)) => (r, s),
        (Value::Object(_), _) => return root.clone(),
        (_, sub) => return sub.clone(),
    };

    let mut out = root_map.clone();
    for (key, value) in sub_map {
        let merged = match (key.as_str(), out.get(key)) {
            ("required", Some(Value::Array(a))) if value.is_array() => union_required(a, value),
            ("properties", Some(Value::Object(a))) if value.is_object() => union_properties(a, value),
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }

    if !matches!(out.get("items"), Some(Value::Array(_))) {
        out.shift_remove("additionalItems");
    }
    Value::Object(out)
}

fn union_required(a: &[Value], b: &Value) -> Value {
    let mut out = a.to_vec();
    for v in b.as_array().into_iter().flatten() {
        if !out.contains(v) {
            out.push(v.clone());
        }
    }
    Value::Array(out)
}

fn union_properties(a: &Map<String, Value>, b: &Value) -> Value {
    let mut out = a.clone();
    for (k, v) in b.as_object().into_iter().flatten() {
        out.insert(k.clone(), v.clone());
    }
    Value::Object(out)
}

/// Clone of `node` without the listed keywords. Non-objects pass through.
pub fn without(node: &Value, keys: &[&str]) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Clone of `node` with `key` set to `value`.
pub fn with(node: &Value, key: &str, value: Value) -> Value {
    let mut map = match node {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    map.insert(key.to_string(), value);
    Value::Object(map)
}
