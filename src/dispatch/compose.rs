//! Composition combinators: `allOf`, `oneOf`, `anyOf`, `type: [..]`.
//!
//! Each strips its own keyword to get the root, derives the root exactly
//! once, then folds over the keyword's list merging every element over the
//! root before deriving it.

use serde_json::Value;

use super::Deriver;
use crate::error::Result;
use crate::merge::{merge, with, without};
use crate::meta::MetaType;

/// `acc = Intersect([derive(merge(root, sub_i)), acc])`, seeded with the
/// parsed root.
pub fn derive_all_of(d: &Deriver<'_>, node: &Value, subs: &[Value]) -> Result<MetaType> {
    let root = without(node, &["allOf"]);
    let parsed_root = d.derive(&root)?;
    subs.iter().try_fold(parsed_root, |acc, sub| {
        Ok(MetaType::intersect([d.derive(&merge(&root, sub))?, acc]))
    })
}

/// Same shape as `anyOf`: exclusivity is not modelled.
pub fn derive_one_of(d: &Deriver<'_>, node: &Value, subs: &[Value]) -> Result<MetaType> {
    derive_union_of(d, node, "oneOf", subs)
}

pub fn derive_any_of(d: &Deriver<'_>, node: &Value, subs: &[Value]) -> Result<MetaType> {
    derive_union_of(d, node, "anyOf", subs)
}

fn derive_union_of(d: &Deriver<'_>, node: &Value, keyword: &str, subs: &[Value]) -> Result<MetaType> {
    let root = without(node, &[keyword]);
    let parsed_root = d.derive(&root)?;
    let branches = subs
        .iter()
        .map(|sub| Ok(MetaType::intersect([parsed_root.clone(), d.derive(&merge(&root, sub))?])))
        .collect::<Result<Vec<_>>>()?;
    Ok(MetaType::union(branches))
}

/// One derivation per listed type, with `type` pinned to it.
pub fn derive_multiple_types(d: &Deriver<'_>, node: &Value, types: &[Value]) -> Result<MetaType> {
    let root = without(node, &["type"]);
    let members = types
        .iter()
        .map(|ty| d.derive(&with(&root, "type", ty.clone())))
        .collect::<Result<Vec<_>>>()?;
    Ok(MetaType::union(members))
}

#[cfg(test)]
mod tests {
    use crate::dispatch::derive;
    use crate::meta::{MetaType, Primitive};
    use crate::options::DeriveOptions;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn d(schema: Value) -> MetaType {
        derive(&schema, &DeriveOptions::default()).unwrap()
    }

    fn string() -> MetaType {
        MetaType::Primitive(Primitive::String)
    }

    fn number() -> MetaType {
        MetaType::Primitive(Primitive::Number)
    }

    #[test]
    fn empty_all_of_is_the_root() {
        let root = json!({"type": "string", "minLength": 2});
        let mut with_all_of = root.clone();
        with_all_of["allOf"] = json!([]);
        assert_eq!(d(with_all_of), d(root));
    }

    #[test]
    fn all_of_folds_left_over_the_root() {
        let t = d(json!({
            "type": "number",
            "allOf": [{"const": 1}, {"enum": [1, 2]}]
        }));
        // root = number; step 1 = const(1) & number; step 2 = enum & number
        let step1 = MetaType::Intersect(vec![MetaType::Const(json!(1)), number()]);
        let step2 = MetaType::Intersect(vec![MetaType::Enum(vec![json!(1), json!(2)]), number()]);
        let expected = MetaType::Intersect(vec![
            step2,
            MetaType::Intersect(vec![step1, number()]),
        ]);
        assert_eq!(t, expected);
        assert_eq!(t.narrow(), MetaType::Const(json!(1)));
    }

    #[test]
    fn one_of_and_any_of_share_a_shape() {
        let subs = json!([{"type": "string"}, {"type": "number"}, {"const": null}]);
        let one = d(json!({"minimum": 0, "oneOf": subs.clone()}));
        let any = d(json!({"minimum": 0, "anyOf": subs}));
        assert_eq!(one, any);
        assert_eq!(one, MetaType::Union(vec![string(), number(), MetaType::null()]));
    }

    #[test]
    fn union_branches_intersect_the_parsed_root() {
        let t = d(json!({"type": "string", "anyOf": [{"const": "a"}, {"const": 2}]}));
        let branch = |c: Value| {
            MetaType::Intersect(vec![string(), MetaType::Intersect(vec![MetaType::Const(c), string()])])
        };
        assert_eq!(t, MetaType::Union(vec![branch(json!("a")), branch(json!(2))]));
        assert_eq!(t.narrow(), MetaType::Const(json!("a")));
    }

    #[test]
    fn empty_union_lists_are_never() {
        assert_eq!(d(json!({"anyOf": []})), MetaType::Never);
        assert_eq!(d(json!({"oneOf": []})), MetaType::Never);
        assert_eq!(d(json!({"type": []})), MetaType::Never);
    }

    #[test]
    fn multiple_types_match_any_of_over_the_same_root() {
        let multi = d(json!({"type": ["string", "number"]}));
        let any = d(json!({"anyOf": [{"type": "string"}, {"type": "number"}]}));
        assert_eq!(multi, any);
        assert_eq!(multi, MetaType::Union(vec![string(), number()]));
    }

    #[test]
    fn multiple_types_pin_the_root() {
        let t = d(json!({
            "type": ["array", "null"],
            "items": {"type": "integer"}
        }));
        assert_eq!(
            t,
            MetaType::Union(vec![MetaType::Array(Box::new(number())), MetaType::null()])
        );
    }

    /// Counts `dispatch` events, i.e. nodes handed to the engine.
    struct DispatchCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for DispatchCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
            if event.metadata().target() == "json_metatype::dispatch" {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn dispatch_count(schema: Value) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(DispatchCounter(count.clone()));
        tracing::subscriber::with_default(subscriber, || d(schema));
        count.load(Ordering::SeqCst)
    }

    #[test]
    fn root_is_derived_once_per_fold() {
        // the root alone dispatches 3 nodes: itself and two properties
        let root = json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}}
        });
        for keyword in ["allOf", "anyOf", "oneOf"] {
            let mut node = root.clone();
            node[keyword] = json!([{"required": ["a"]}, {"required": ["b"]}]);
            // node + root + one merged root per element
            assert_eq!(dispatch_count(node), 1 + 3 + 2 * 3, "{keyword}");
        }

        let mut node = root;
        node["type"] = json!(["object", "null"]);
        assert_eq!(dispatch_count(node), 1 + 3 + 1);
    }

    #[test]
    fn sub_schemas_see_root_properties() {
        let t = d(json!({
            "type": "object",
            "properties": {"kind": {"type": "string"}},
            "required": ["kind"],
            "oneOf": [
                {"properties": {"kind": {"const": "a"}, "a": {"type": "number"}}, "required": ["a"]},
                {"properties": {"kind": {"const": "b"}}}
            ]
        }))
        .narrow();
        assert_eq!(t.accepts(&json!({"kind": "a", "a": 1})), Some(true));
        assert_eq!(t.accepts(&json!({"kind": "a"})), Some(false));
        assert_eq!(t.accepts(&json!({"kind": "b"})), Some(true));
        assert_eq!(t.accepts(&json!({"kind": "c"})), Some(false));
    }
}
