//! Canonicalization registry.
//!
//! Structurally identical shapes found at different paths collapse into the
//! first registered copy, so they share one declaration.
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::node::TypeNode;

pub trait Universe {
    /// Return a deep copy of the first registered node that is strictly the
    /// same type as `candidate`, or register `candidate` and echo it back.
    fn find_or_register(&mut self, candidate: TypeNode) -> TypeNode;

    fn types(&self) -> &[TypeNode];

    fn len(&self) -> usize {
        self.types().len()
    }

    fn is_empty(&self) -> bool {
        self.types().is_empty()
    }
}

/// Registers nothing and echoes every candidate back.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyUniverse;

impl Universe for EmptyUniverse {
    fn find_or_register(&mut self, candidate: TypeNode) -> TypeNode {
        candidate
    }

    fn types(&self) -> &[TypeNode] {
        &[]
    }
}

/// Cheap pre-filter. Strict equality implies equal shapes, except that
/// `Any` matches everything, so `Any`-bearing shapes are wildcards.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Shape {
    Wildcard,
    Scalar,
    Struct(BTreeSet<String>),
    Array,
    Map,
}

impl Shape {
    fn of(node: &TypeNode) -> Self {
        match node {
            n if n.is_any() => Shape::Wildcard,
            TypeNode::Scalar(_) => Shape::Scalar,
            TypeNode::Struct(s) => Shape::Struct(s.fields.keys().cloned().collect()),
            TypeNode::Array(_) => Shape::Array,
            TypeNode::Map(_) => Shape::Map,
        }
    }

    fn may_match(&self, other: &Shape) -> bool {
        matches!(self, Shape::Wildcard) || matches!(other, Shape::Wildcard) || self == other
    }
}

/// Linear scan, first match wins.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    types: Vec<TypeNode>,
    shapes: Vec<Shape>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing types so inference reuses them.
    pub fn with_seed<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = TypeNode>,
    {
        let mut out = Self::new();
        for t in seed {
            out.register(t);
        }
        out
    }

    /// Seed from a JSON array of serialized type nodes.
    pub fn from_seed_json(src: &str) -> Result<Self> {
        let de = &mut serde_json::Deserializer::from_str(src);
        let seed: Vec<TypeNode> = serde_path_to_error::deserialize(de).map_err(|err| {
            let path = err.path().to_string();
            Error::Seed { message: format!("at JSON path {path}: {}", err.into_inner()) }
        })?;
        Ok(Self::with_seed(seed))
    }

    pub fn register(&mut self, node: TypeNode) {
        self.shapes.push(Shape::of(&node));
        self.types.push(node);
    }
}

impl Universe for Registry {
    fn find_or_register(&mut self, candidate: TypeNode) -> TypeNode {
        let shape = Shape::of(&candidate);
        let hit = self
            .types
            .iter()
            .zip(&self.shapes)
            .find(|(t, s)| s.may_match(&shape) && t.same_type(&candidate));
        if let Some((found, _)) = hit {
            tracing::debug!(
                candidate = %candidate.display_name(),
                canonical = %found.display_name(),
                "universe hit"
            );
            return found.clone();
        }
        self.register(candidate.clone());
        candidate
    }

    fn types(&self) -> &[TypeNode] {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::StructType;
    use crate::scalar::Scalar;

    fn named(name: &str, keys: &[&str]) -> TypeNode {
        let mut s = StructType::new(name);
        for k in keys {
            s.insert(*k, Scalar::string().into());
        }
        s.into()
    }

    #[test]
    fn returns_registered_instance_for_identical_shape() {
        let mut u = Registry::new();
        let s1 = u.find_or_register(named("S1", &["x"]));
        assert_eq!(s1.display_name(), "S1");
        let s2 = u.find_or_register(named("S2", &["x"]));
        assert_eq!(s2.display_name(), "S1");
        assert_eq!(u.len(), 1);
    }

    #[test]
    fn different_shapes_register_separately_in_order() {
        let mut u = Registry::new();
        u.find_or_register(named("A", &["x"]));
        u.find_or_register(named("B", &["x", "y"]));
        let names: Vec<_> = u.types().iter().map(TypeNode::display_name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn lookup_is_strict_and_does_not_widen() {
        let mut u = Registry::new();
        u.find_or_register(named("A", &["x"]));
        let got = u.find_or_register(named("B", &["x", "y"]));
        assert_eq!(got.display_name(), "B");
        assert_eq!(u.types()[0].as_struct().unwrap().fields.len(), 1);
    }

    #[test]
    fn any_fields_still_match_through_prefilter() {
        let mut a = StructType::new("A");
        a.insert("x", TypeNode::any());
        let mut u = Registry::with_seed([TypeNode::from(a)]);
        let got = u.find_or_register(named("B", &["x"]));
        assert_eq!(got.display_name(), "A");
    }

    #[test]
    fn empty_universe_echoes() {
        let mut u = EmptyUniverse;
        let got = u.find_or_register(named("S2", &["x"]));
        assert_eq!(got.display_name(), "S2");
        assert!(u.is_empty());
    }

    #[test]
    fn seed_json_reports_path_on_error() {
        let ok = Registry::from_seed_json(
            r#"[{"kind":"struct","name":"User","fields":{"id":{"type":{"kind":"scalar","token":"string"},"key":"id"}}}]"#,
        ).unwrap();
        assert_eq!(ok.len(), 1);

        let err = Registry::from_seed_json(r#"[{"kind":"struct","name":7,"fields":{}}]"#).unwrap_err();
        match err {
            Error::Seed { message } => assert!(message.contains("[0]"), "{message}"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
