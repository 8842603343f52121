//! Schema node classification.
//!
//! A node can carry several recognized keywords at once; `classify` picks
//! the one that decides how the node is derived. The precedence below is
//! load-bearing: reordering it changes results.
//!
//! 1. `true` / non-object / `{}`       -> Unconstrained
//! 2. `false`                          -> Forbidden
//! 3. `nullable` (bool)                -> Nullable
//! 4. `$ref`                           -> Reference
//! 5. `if` (when enabled)              -> IfThenElse
//! 6. `not` (when enabled)             -> Not
//! 7. `allOf`, `oneOf`, `anyOf`, `enum`, `const`, `type: [..]`, `type: ".."`
//! 8. anything else                    -> Unrecognized

use serde_json::Value;

use crate::options::DeriveOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Unconstrained,
    Forbidden,
    Nullable(bool),
    Reference(&'a Value),
    IfThenElse,
    Not,
    AllOf(&'a [Value]),
    OneOf(&'a [Value]),
    AnyOf(&'a [Value]),
    Enum(&'a [Value]),
    Const(&'a Value),
    MultipleTypes(&'a [Value]),
    SingleType(&'a str),
    Unrecognized,
}

impl Shape<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Unconstrained => "unconstrained",
            Shape::Forbidden => "forbidden",
            Shape::Nullable(_) => "nullable",
            Shape::Reference(_) => "$ref",
            Shape::IfThenElse => "if/then/else",
            Shape::Not => "not",
            Shape::AllOf(_) => "allOf",
            Shape::OneOf(_) => "oneOf",
            Shape::AnyOf(_) => "anyOf",
            Shape::Enum(_) => "enum",
            Shape::Const(_) => "const",
            Shape::MultipleTypes(_) => "type[]",
            Shape::SingleType(_) => "type",
            Shape::Unrecognized => "unrecognized",
        }
    }
}

pub fn classify<'a>(node: &'a Value, options: &DeriveOptions) -> Shape<'a> {
    let map = match node {
        Value::Bool(false) => return Shape::Forbidden,
        Value::Object(map) if !map.is_empty() => map,
        _ => return Shape::Unconstrained,
    };

    if let Some(Value::Bool(b)) = map.get("nullable") {
        return Shape::Nullable(*b);
    }
    if let Some(reference) = map.get("$ref") {
        return Shape::Reference(reference);
    }
    if options.parse_if_then_else_keywords && map.contains_key("if") {
        return Shape::IfThenElse;
    }
    if options.parse_not_keyword && map.contains_key("not") {
        return Shape::Not;
    }

    if let Some(Value::Array(subs)) = map.get("allOf") {
        return Shape::AllOf(subs);
    }
    if let Some(Value::Array(subs)) = map.get("oneOf") {
        return Shape::OneOf(subs);
    }
    if let Some(Value::Array(subs)) = map.get("anyOf") {
        return Shape::AnyOf(subs);
    }
    if let Some(Value::Array(values)) = map.get("enum") {
        return Shape::Enum(values);
    }
    if let Some(value) = map.get("const") {
        return Shape::Const(value);
    }
    match map.get("type") {
        Some(Value::Array(types)) => Shape::MultipleTypes(types),
        Some(Value::String(ty)) => Shape::SingleType(ty),
        _ => Shape::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape_name(node: Value, options: &DeriveOptions) -> &'static str {
        classify(&node, options).name()
    }

    #[test]
    fn boolean_and_empty_nodes() {
        let o = DeriveOptions::default();
        assert_eq!(classify(&json!(true), &o), Shape::Unconstrained);
        assert_eq!(classify(&json!({}), &o), Shape::Unconstrained);
        assert_eq!(classify(&json!("string"), &o), Shape::Unconstrained);
        assert_eq!(classify(&json!(false), &o), Shape::Forbidden);
    }

    #[test]
    fn nullable_beats_reference_beats_composition() {
        let o = DeriveOptions::default();
        let node = json!({"nullable": true, "$ref": "#/a", "allOf": []});
        assert_eq!(shape_name(node, &o), "nullable");
        let node = json!({"$ref": "#/a", "allOf": [], "type": "string"});
        assert_eq!(shape_name(node, &o), "$ref");
    }

    #[test]
    fn conditional_and_negation_are_opt_in() {
        let node = json!({"type": "object", "if": {}, "then": {}, "not": {}});
        let off = DeriveOptions::default();
        assert_eq!(shape_name(node.clone(), &off), "type");
        let not_only = DeriveOptions::default().parse_not(true);
        assert_eq!(shape_name(node.clone(), &not_only), "not");
        let both = not_only.parse_if_then_else(true);
        assert_eq!(shape_name(node, &both), "if/then/else");
    }

    #[test]
    fn composition_order_is_fixed() {
        let o = DeriveOptions::default();
        let node = json!({"anyOf": [], "oneOf": [], "allOf": [], "enum": [1], "type": "string"});
        assert_eq!(shape_name(node, &o), "allOf");
        let node = json!({"anyOf": [], "oneOf": [], "enum": [1]});
        assert_eq!(shape_name(node, &o), "oneOf");
        let node = json!({"anyOf": [], "enum": [1], "const": 1});
        assert_eq!(shape_name(node, &o), "anyOf");
        let node = json!({"const": 1, "enum": [1], "type": ["string"]});
        assert_eq!(shape_name(node, &o), "enum");
        let node = json!({"const": 1, "type": ["string"]});
        assert_eq!(shape_name(node, &o), "const");
        let node = json!({"type": ["string", "null"]});
        assert_eq!(shape_name(node, &o), "type[]");
    }

    #[test]
    fn malformed_keywords_fall_through() {
        let o = DeriveOptions::default();
        assert_eq!(classify(&json!({"allOf": {}, "type": "string"}), &o), Shape::SingleType("string"));
        assert_eq!(classify(&json!({"nullable": "yes"}), &o), Shape::Unrecognized);
        assert_eq!(classify(&json!({"minimum": 3}), &o), Shape::Unrecognized);
    }
}
