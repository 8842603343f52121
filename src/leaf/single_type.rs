//! Single-valued `type`.
//!
//! - `null` -> `Const(null)`
//! - `boolean`, `string` -> primitives; `number` and `integer` -> `Number`
//! - `array`  -> `Tuple` for `prefixItems` / list-valued `items`, else `Array`
//! - `object` -> `Object` (properties, required, rest)
//! - anything else -> `Any`

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::dispatch::Deriver;
use crate::error::Result;
use crate::meta::{MetaType, Primitive};

pub fn derive_single_type(d: &Deriver<'_>, node: &Value, ty: &str) -> Result<MetaType> {
    let empty = Map::new();
    let map = node.as_object().unwrap_or(&empty);
    match ty {
        "null" => Ok(MetaType::null()),
        "boolean" => Ok(MetaType::Primitive(Primitive::Boolean)),
        "string" => Ok(MetaType::Primitive(Primitive::String)),
        "number" | "integer" => Ok(MetaType::Primitive(Primitive::Number)),
        "array" => derive_array(d, map),
        "object" => derive_object(d, map),
        _ => Ok(MetaType::Any),
    }
}

// ------------------------------- Arrays ----------------------------------- //

fn derive_array(d: &Deriver<'_>, map: &Map<String, Value>) -> Result<MetaType> {
    // 2020-12 `prefixItems` + `items`, or draft-4 `items: [..]` + `additionalItems`
    let (prefix, rest) = match (map.get("prefixItems"), map.get("items")) {
        (Some(Value::Array(prefix)), rest) => (prefix, rest),
        (_, Some(Value::Array(prefix))) => (prefix, map.get("additionalItems")),
        (_, items) => {
            let items = match items {
                Some(schema) => d.derive(schema)?,
                None => MetaType::Any,
            };
            return Ok(MetaType::Array(Box::new(items)));
        }
    };

    let prefix = prefix.iter().map(|s| d.derive(s)).collect::<Result<Vec<_>>>()?;
    let rest = match rest {
        Some(schema) => d.derive(schema)?,
        None => MetaType::Any,
    };
    let min_items = map
        .get("minItems")
        .and_then(Value::as_u64)
        .map_or(0, |n| usize::try_from(n).unwrap_or(usize::MAX))
        .min(prefix.len());
    Ok(MetaType::Tuple { prefix, min_items, rest: Box::new(rest) })
}

// ------------------------------- Objects ---------------------------------- //

fn derive_object(d: &Deriver<'_>, map: &Map<String, Value>) -> Result<MetaType> {
    let mut required: Vec<String> = Vec::new();
    if let Some(Value::Array(names)) = map.get("required") {
        for name in names.iter().filter_map(Value::as_str) {
            if !required.iter().any(|r| r == name) {
                required.push(name.to_string());
            }
        }
    }

    let keep_defaulted_optional = d.options().keep_defaulted_properties_optional;
    let mut properties = IndexMap::new();
    if let Some(Value::Object(props)) = map.get("properties") {
        for (name, schema) in props {
            properties.insert(name.clone(), d.derive(schema)?);
            // a defaulted property is always present once defaults are applied
            let defaulted = schema.get("default").is_some();
            if defaulted && !keep_defaulted_optional && !required.contains(name) {
                required.push(name.clone());
            }
        }
    }

    let additional = match map.get("additionalProperties") {
        Some(schema) => d.derive(schema)?,
        None => MetaType::Any,
    };
    let mut rest = vec![additional];
    if let Some(Value::Object(patterns)) = map.get("patternProperties") {
        for schema in patterns.values() {
            rest.push(d.derive(schema)?);
        }
    }

    Ok(MetaType::Object {
        properties,
        required,
        rest: Box::new(MetaType::union(rest)),
    })
}
