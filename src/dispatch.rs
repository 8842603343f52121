// src/dispatch.rs
//! Recursive dispatch engine.
//!
//! `derive` classifies a node (see `crate::shape`), hands it to the matching
//! combinator or leaf collaborator, and every one of those re-enters
//! `Deriver::derive` for the sub-schemas it builds. When deserialize
//! patterns are configured the core result of each node is intersected with
//! the override implied by the patterns.
//!
//! Pure and synchronous: no I/O, no shared state, nothing cached between
//! calls. Reference cycles recurse without bound.
pub mod compose;
pub mod reference;

use serde_json::Value;

use crate::error::Result;
use crate::leaf;
use crate::meta::MetaType;
use crate::options::DeriveOptions;
use crate::shape::{classify, Shape};

/// Borrowed view of the options plus the document `#/...` references
/// resolve against.
#[derive(Debug, Clone, Copy)]
pub struct Deriver<'a> {
    options: &'a DeriveOptions,
    root: &'a Value,
}

impl<'a> Deriver<'a> {
    /// `root` is used as the reference root unless the options name one.
    pub fn new(root: &'a Value, options: &'a DeriveOptions) -> Self {
        let root = if options.root_schema.is_null() { root } else { &options.root_schema };
        Self { options, root }
    }

    pub fn options(&self) -> &'a DeriveOptions {
        self.options
    }

    pub fn root(&self) -> &'a Value {
        self.root
    }

    pub fn derive(&self, node: &Value) -> Result<MetaType> {
        let core = self.derive_core(node)?;
        match self.options.deserialize_patterns() {
            None => Ok(core),
            // The core above went straight to dispatch, so the patterns are
            // not re-applied to this node; descendants still get them.
            Some(patterns) => Ok(MetaType::intersect([leaf::deserialize::override_for(node, patterns), core])),
        }
    }

    fn derive_core(&self, node: &Value) -> Result<MetaType> {
        let shape = classify(node, self.options);
        tracing::trace!(shape = shape.name(), "dispatch");
        match shape {
            Shape::Unconstrained | Shape::Unrecognized => Ok(MetaType::Any),
            Shape::Forbidden => Ok(MetaType::Never),
            Shape::Nullable(nullable) => leaf::nullable::derive_nullable(self, node, nullable),
            Shape::Reference(reference) => reference::derive_reference(self, node, reference),
            Shape::IfThenElse => leaf::conditional::derive_if_then_else(self, node),
            Shape::Not => leaf::not::derive_not(self, node),
            Shape::AllOf(subs) => compose::derive_all_of(self, node, subs),
            Shape::OneOf(subs) => compose::derive_one_of(self, node, subs),
            Shape::AnyOf(subs) => compose::derive_any_of(self, node, subs),
            Shape::Enum(values) => leaf::literal::derive_enum(self, node, values),
            Shape::Const(value) => leaf::literal::derive_const(self, node, value),
            Shape::MultipleTypes(types) => compose::derive_multiple_types(self, node, types),
            Shape::SingleType(ty) => leaf::single_type::derive_single_type(self, node, ty),
        }
    }
}

/// Derive the meta-type of `root` under `options`.
pub fn derive(root: &Value, options: &DeriveOptions) -> Result<MetaType> {
    Deriver::new(root, options).derive(root)
}

// ------------------------------- Tests ------------------------------------ //
