//! Keyword collaborators the dispatch engine hands concrete nodes to.
//!
//! None of these fold over composition keywords; they re-enter the engine
//! only for nested schemas (properties, items, the node minus their own
//! keyword).
pub mod conditional;
pub mod deserialize;
pub mod literal;
pub mod not;
pub mod nullable;
pub mod single_type;

use crate::meta::MetaType;

/// Exclusions need a concrete source: `Any` is spelled out as the union of
/// every JSON kind so there is something to remove from.
pub(crate) fn exclusion_source(t: MetaType) -> MetaType {
    if t.is_any() { MetaType::json_kinds() } else { t }
}
