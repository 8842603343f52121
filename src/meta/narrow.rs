//! Narrowing: reduce a derived meta-type toward its canonical value set.
//!
//! - flattens nested unions, drops duplicate members
//! - distributes intersection over union
//! - intersects leaves (literal filtering, primitive equality, member-wise
//!   arrays/tuples/objects, disjoint kinds -> `Never`)
//! - resolves exclusions whose outcome is decidable
//!
//! Anything it can't decide stays as an `Intersect`/`Exclude` wrapper, with
//! the members of an undecided intersection in a canonical order. Passes
//! repeat until nothing changes, so narrowing a narrowed type is a no-op.

use indexmap::IndexMap;
use serde_json::Value;

use super::MetaType;

impl MetaType {
    pub fn narrow(&self) -> MetaType {
        narrow(self)
    }
}

/// Bound on repeated passes.
const MAX_PASSES: usize = 32;

pub fn narrow(t: &MetaType) -> MetaType {
    let mut current = narrow_pass(t);
    for _ in 0..MAX_PASSES {
        let next = narrow_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn narrow_pass(t: &MetaType) -> MetaType {
    match t {
        MetaType::Union(members) => union_of(members.iter().map(narrow_pass)),
        MetaType::Intersect(members) => members.iter().map(narrow_pass).fold(MetaType::Any, meet),
        MetaType::Enum(values) => {
            let mut out: Vec<Value> = Vec::with_capacity(values.len());
            for v in values {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            MetaType::literals(out)
        }
        MetaType::Array(items) => MetaType::Array(Box::new(narrow_pass(items))),
        MetaType::Tuple { prefix, min_items, rest } => tuple(
            prefix.iter().map(narrow_pass).collect(),
            *min_items,
            narrow_pass(rest),
        ),
        MetaType::Object { properties, required, rest } => object(
            properties.iter().map(|(k, t)| (k.clone(), narrow_pass(t))).collect(),
            required.clone(),
            narrow_pass(rest),
        ),
        MetaType::Exclude { source, excluded } => exclude(narrow_pass(source), narrow_pass(excluded)),
        leaf => leaf.clone(),
    }
}

// ------------------------------- Union ----------------------------------- //

fn union_of(members: impl IntoIterator<Item = MetaType>) -> MetaType {
    let mut out: Vec<MetaType> = Vec::new();
    for m in members {
        match m {
            MetaType::Any => return MetaType::Any,
            MetaType::Never => {}
            MetaType::Union(inner) => {
                for x in inner {
                    push_unique(&mut out, x);
                }
            }
            other => push_unique(&mut out, other),
        }
    }
    MetaType::union(out)
}

fn push_unique(out: &mut Vec<MetaType>, t: MetaType) {
    if !out.contains(&t) {
        out.push(t);
    }
}

// ---------------------------- Intersection -------------------------------- //

#[derive(PartialEq, Eq)]
enum Kind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

fn kind(t: &MetaType) -> Option<Kind> {
    use super::Primitive;
    match t {
        MetaType::Const(Value::Null) => Some(Kind::Null),
        MetaType::Primitive(Primitive::Boolean) => Some(Kind::Boolean),
        MetaType::Primitive(Primitive::Number) => Some(Kind::Number),
        MetaType::Primitive(Primitive::String) => Some(Kind::String),
        MetaType::Array(_) | MetaType::Tuple { .. } => Some(Kind::Array),
        MetaType::Object { .. } => Some(Kind::Object),
        MetaType::Exclude { source, .. } => kind(source),
        _ => None,
    }
}

/// Intersection of two already-narrowed meta-types.
fn meet(a: MetaType, b: MetaType) -> MetaType {
    match (a, b) {
        (MetaType::Never, _) | (_, MetaType::Never) => MetaType::Never,
        (MetaType::Any, x) | (x, MetaType::Any) => x,
        (MetaType::Union(ms), x) | (x, MetaType::Union(ms)) => {
            union_of(ms.into_iter().map(|m| meet(m, x.clone())))
        }
        (MetaType::Const(c), other) | (other, MetaType::Const(c)) => match other.accepts(&c) {
            Some(true) => MetaType::Const(c),
            Some(false) => MetaType::Never,
            None => opaque(MetaType::Const(c), other),
        },
        (MetaType::Enum(values), other) | (other, MetaType::Enum(values)) => {
            let mut kept = Vec::new();
            let mut undecided = false;
            for v in values {
                match other.accepts(&v) {
                    Some(true) => kept.push(v),
                    Some(false) => {}
                    None => {
                        undecided = true;
                        kept.push(v);
                    }
                }
            }
            let lits = MetaType::literals(kept);
            if undecided && !lits.is_never() { opaque(lits, other) } else { lits }
        }
        (MetaType::Primitive(p), MetaType::Primitive(q)) => {
            if p == q { MetaType::Primitive(p) } else { MetaType::Never }
        }
        (MetaType::Array(a), MetaType::Array(b)) => MetaType::Array(Box::new(meet(*a, *b))),
        (MetaType::Array(items), MetaType::Tuple { prefix, min_items, rest })
        | (MetaType::Tuple { prefix, min_items, rest }, MetaType::Array(items)) => tuple(
            prefix.into_iter().map(|t| meet(t, (*items).clone())).collect(),
            min_items,
            meet(*rest, *items),
        ),
        (
            MetaType::Tuple { prefix: pa, min_items: ma, rest: ra },
            MetaType::Tuple { prefix: pb, min_items: mb, rest: rb },
        ) => {
            let len = pa.len().max(pb.len());
            let prefix = (0..len)
                .map(|i| {
                    let x = pa.get(i).cloned().unwrap_or_else(|| (*ra).clone());
                    let y = pb.get(i).cloned().unwrap_or_else(|| (*rb).clone());
                    meet(x, y)
                })
                .collect();
            tuple(prefix, ma.max(mb), meet(*ra, *rb))
        }
        (
            MetaType::Object { properties: pa, required: qa, rest: ra },
            MetaType::Object { properties: pb, required: qb, rest: rb },
        ) => {
            let mut properties = IndexMap::new();
            for (k, x) in &pa {
                let y = pb.get(k).cloned().unwrap_or_else(|| (*rb).clone());
                properties.insert(k.clone(), meet(x.clone(), y));
            }
            for (k, y) in pb {
                if !properties.contains_key(&k) {
                    properties.insert(k, meet((*ra).clone(), y));
                }
            }
            let mut required = qa;
            for k in qb {
                if !required.contains(&k) {
                    required.push(k);
                }
            }
            object(properties, required, meet(*ra, *rb))
        }
        (a, b) => match (kind(&a), kind(&b)) {
            (Some(x), Some(y)) if x != y => MetaType::Never,
            _ => opaque(a, b),
        },
    }
}

/// Keep an undecidable intersection, flattening nested ones and ordering
/// the members canonically. Still `Never` when two members are of disjoint
/// kinds or a literal is rejected outright.
fn opaque(a: MetaType, b: MetaType) -> MetaType {
    let mut members = Vec::new();
    for t in [a, b] {
        match t {
            MetaType::Intersect(inner) => {
                for x in inner {
                    push_unique(&mut members, x);
                }
            }
            other => push_unique(&mut members, other),
        }
    }
    let kinds: Vec<Kind> = members.iter().filter_map(kind).collect();
    if kinds.windows(2).any(|w| w[0] != w[1]) {
        return MetaType::Never;
    }
    for lit in members.iter() {
        if let MetaType::Const(c) = lit {
            if members.iter().any(|m| m.accepts(c) == Some(false)) {
                return MetaType::Never;
            }
        }
    }
    members.sort_by_cached_key(canonical_key);
    MetaType::intersect(members)
}

fn canonical_key(t: &MetaType) -> String {
    serde_json::to_string(t).unwrap_or_default()
}

// ----------------------------- Exclusion ---------------------------------- //

fn exclude(source: MetaType, excluded: MetaType) -> MetaType {
    match (source, excluded) {
        (MetaType::Never, _) | (_, MetaType::Any) => MetaType::Never,
        (source, MetaType::Never) => source,
        (source, MetaType::Union(ms)) => ms.into_iter().fold(source, exclude),
        (MetaType::Union(ms), excluded) => {
            union_of(ms.into_iter().map(|m| exclude(m, excluded.clone())))
        }
        (MetaType::Const(c), excluded) => match excluded.accepts(&c) {
            Some(true) => MetaType::Never,
            Some(false) => MetaType::Const(c),
            None => MetaType::exclude(MetaType::Const(c), excluded),
        },
        (MetaType::Enum(values), excluded) => {
            let mut kept = Vec::new();
            let mut undecided = false;
            for v in values {
                match excluded.accepts(&v) {
                    Some(true) => {}
                    Some(false) => kept.push(v),
                    None => {
                        undecided = true;
                        kept.push(v);
                    }
                }
            }
            let lits = MetaType::literals(kept);
            if undecided && !lits.is_never() { MetaType::exclude(lits, excluded) } else { lits }
        }
        (source, excluded) => {
            if source == excluded {
                return MetaType::Never;
            }
            match (kind(&source), kind(&excluded)) {
                (Some(x), Some(y)) if x != y => source,
                _ => MetaType::exclude(source, excluded),
            }
        }
    }
}

// ------------------------------ Containers -------------------------------- //

fn tuple(prefix: Vec<MetaType>, min_items: usize, rest: MetaType) -> MetaType {
    if prefix.iter().take(min_items).any(MetaType::is_never) {
        return MetaType::Never;
    }
    MetaType::Tuple { prefix, min_items, rest: Box::new(rest) }
}

fn object(properties: IndexMap<String, MetaType>, required: Vec<String>, rest: MetaType) -> MetaType {
    let missing_required = required
        .iter()
        .any(|k| properties.get(k).unwrap_or(&rest).is_never());
    if missing_required {
        return MetaType::Never;
    }
    MetaType::Object { properties, required, rest: Box::new(rest) }
}

// ------------------------------- Tests ------------------------------------ //
