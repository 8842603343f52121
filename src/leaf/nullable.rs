//! OpenAPI-style `nullable`.

use serde_json::Value;

use crate::dispatch::Deriver;
use crate::error::Result;
use crate::merge::without;
use crate::meta::MetaType;

pub fn derive_nullable(d: &Deriver<'_>, node: &Value, nullable: bool) -> Result<MetaType> {
    let parsed = d.derive(&without(node, &["nullable"]))?;
    if nullable {
        Ok(MetaType::union([MetaType::null(), parsed]))
    } else {
        Ok(parsed)
    }
}
