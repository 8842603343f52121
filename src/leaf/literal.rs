//! `enum` and `const`: the literal set intersected with the rest of the node.

use serde_json::Value;

use crate::dispatch::Deriver;
use crate::error::Result;
use crate::merge::without;
use crate::meta::MetaType;

pub fn derive_enum(d: &Deriver<'_>, node: &Value, values: &[Value]) -> Result<MetaType> {
    let literals = if values.is_empty() { MetaType::Never } else { MetaType::Enum(values.to_vec()) };
    let rest = d.derive(&without(node, &["enum"]))?;
    Ok(MetaType::intersect([literals, rest]))
}

pub fn derive_const(d: &Deriver<'_>, node: &Value, value: &Value) -> Result<MetaType> {
    let rest = d.derive(&without(node, &["const"]))?;
    Ok(MetaType::intersect([MetaType::Const(value.clone()), rest]))
}
