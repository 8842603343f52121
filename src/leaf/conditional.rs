//! `if` / `then` / `else`.
//!
//! With `R` the node minus the three keywords:
//!
//! ```text
//! ((R+if & R+then) | Exclude<R+else, R+if>) & R
//! ```
//!
//! A missing `then` contributes just `R+if`; a missing `else` excludes from
//! `R` itself.

use serde_json::Value;

use super::exclusion_source;
use crate::dispatch::Deriver;
use crate::error::Result;
use crate::merge::{merge, without};
use crate::meta::MetaType;

pub fn derive_if_then_else(d: &Deriver<'_>, node: &Value) -> Result<MetaType> {
    let rest = without(node, &["if", "then", "else"]);
    let Some(if_schema) = node.get("if") else {
        return d.derive(&rest);
    };

    let parsed_rest = d.derive(&rest)?;
    let parsed_if = d.derive(&merge(&rest, if_schema))?;

    let then_branch = match node.get("then") {
        Some(then_schema) => MetaType::intersect([parsed_if.clone(), d.derive(&merge(&rest, then_schema))?]),
        None => parsed_if.clone(),
    };
    let else_source = match node.get("else") {
        Some(else_schema) => d.derive(&merge(&rest, else_schema))?,
        None => parsed_rest.clone(),
    };
    let else_branch = MetaType::exclude(exclusion_source(else_source), parsed_if);

    Ok(MetaType::intersect([MetaType::union([then_branch, else_branch]), parsed_rest]))
}

#[cfg(test)]
mod tests {
    use crate::dispatch::derive;
    use crate::meta::MetaType;
    use crate::options::DeriveOptions;
    use serde_json::{json, Value};

    fn d(schema: Value) -> MetaType {
        derive(&schema, &DeriveOptions::new().parse_if_then_else(true)).unwrap()
    }

    #[test]
    fn branches_on_a_discriminator() {
        let t = d(json!({
            "type": "object",
            "properties": {"kind": {"enum": ["a", "b"]}},
            "required": ["kind"],
            "if": {"properties": {"kind": {"const": "a"}}},
            "then": {"properties": {"n": {"type": "number"}}, "required": ["n"]},
            "else": {"properties": {"s": {"type": "string"}}, "required": ["s"]}
        }))
        .narrow();
        assert_eq!(t.accepts(&json!({"kind": "a", "n": 1})), Some(true));
        assert_eq!(t.accepts(&json!({"kind": "b", "s": "x"})), Some(true));
        assert_eq!(t.accepts(&json!({"kind": "a"})), Some(false));
        assert_eq!(t.accepts(&json!("a")), Some(false));
    }

    #[test]
    fn missing_then_keeps_the_condition() {
        let t = d(json!({"enum": [1, 2, 3], "if": {"const": 1}, "else": {"const": 3}})).narrow();
        assert_eq!(t.accepts(&json!(1)), Some(true));
        assert_eq!(t.accepts(&json!(3)), Some(true));
        assert_eq!(t.accepts(&json!(2)), Some(false));
    }

    #[test]
    fn missing_else_excludes_from_the_rest() {
        let t = d(json!({"enum": [1, 2], "if": {"const": 1}, "then": {"const": 2}})).narrow();
        // 1 satisfies `if` but not `then`; 2 falls through to the else side
        assert_eq!(t, MetaType::Const(json!(2)));
    }

    #[test]
    fn lone_then_and_else_are_ignored() {
        let schema = json!({"type": "string", "then": {"const": "a"}, "else": {"const": "b"}});
        assert_eq!(d(schema.clone()), derive(&json!({"type": "string"}), &DeriveOptions::default()).unwrap());
    }
}
