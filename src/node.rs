//! Type node model.
//!
//! A [`TypeNode`] is one node of the inferred schema graph. Nodes own their
//! children outright; the only sharing happens through the universe, which
//! always hands out deep copies.
//!
//! Three comparisons live here:
//! - [`TypeNode::same_type`]: strict and pure. Field sets must match.
//! - [`TypeNode::unify`]: forgiving and pure. Missing fields are tolerated
//!   and the union comes back as a fresh node.
//! - [`TypeNode::same_type_forgiving`]: the forgiving comparison as a
//!   side-effecting query. On success `self` is widened in place.
//!
//! In all of them the `Any` scalar is equal to everything.
pub mod arr;
pub mod map;
pub mod obj;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scalar::Scalar;

pub use arr::ArrayType;
pub use map::MapType;
pub use obj::{Field, StructType};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Scalar,
    Struct,
    Array,
    Map,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeKind::Scalar => "scalar",
            TypeKind::Struct => "struct",
            TypeKind::Array => "array",
            TypeKind::Map => "map",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeNode {
    Scalar(Scalar),
    Struct(StructType),
    Array(ArrayType),
    /// Only ever produced by cleanup.
    Map(MapType),
}

impl From<Scalar> for TypeNode {
    fn from(s: Scalar) -> Self { TypeNode::Scalar(s) }
}

impl From<StructType> for TypeNode {
    fn from(s: StructType) -> Self { TypeNode::Struct(s) }
}

impl TypeNode {
    pub fn any() -> Self {
        TypeNode::Scalar(Scalar::any())
    }

    pub fn array_of(element: TypeNode) -> Self {
        TypeNode::Array(ArrayType::new(element))
    }

    pub fn map_of(value: TypeNode) -> Self {
        TypeNode::Map(MapType::new(value))
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            TypeNode::Scalar(_) => TypeKind::Scalar,
            TypeNode::Struct(_) => TypeKind::Struct,
            TypeNode::Array(_) => TypeKind::Array,
            TypeNode::Map(_) => TypeKind::Map,
        }
    }

    /// Composite nodes need a declaration of their own.
    pub fn is_composite(&self) -> bool {
        !matches!(self, TypeNode::Scalar(_))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeNode::Scalar(s) if s.is_any())
    }

    /// Declared name for structs, a type expression for arrays and maps,
    /// and the fixed token for scalars.
    pub fn display_name(&self) -> String {
        match self {
            TypeNode::Scalar(s) => s.token.to_string(),
            TypeNode::Struct(s) => s.name.clone(),
            TypeNode::Array(a) => format!("Array<{}>", a.element.display_name()),
            TypeNode::Map(m) => format!("Map<{}>", m.value.display_name()),
        }
    }

    pub fn as_struct(&self) -> Option<&StructType> {
        match self {
            TypeNode::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_mut(&mut self) -> Option<&mut StructType> {
        match self {
            TypeNode::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// The struct behind any number of array/map wrappers.
    pub fn underlying_struct(&self) -> Option<&StructType> {
        match self {
            TypeNode::Struct(s) => Some(s),
            TypeNode::Array(a) => a.element.underlying_struct(),
            TypeNode::Map(m) => m.value.underlying_struct(),
            TypeNode::Scalar(_) => None,
        }
    }

    /// Import tags needed by this node, sorted and de-duplicated.
    pub fn imports(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_imports(&mut out);
        out
    }

    fn collect_imports(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeNode::Scalar(s) => out.extend(s.import.iter().cloned()),
            TypeNode::Struct(s) => match &s.import {
                Some(i) => { out.insert(i.clone()); }
                None => s.fields.values().for_each(|f| f.ty.collect_imports(out)),
            },
            TypeNode::Array(a) => a.element.collect_imports(out),
            TypeNode::Map(m) => m.value.collect_imports(out),
        }
    }

    // ----------------------------- Equality ------------------------------ //

    /// Strict structural equality. Names are ignored; field sets must match.
    pub fn same_type(&self, other: &TypeNode) -> bool {
        if self.is_any() || other.is_any() {
            return true;
        }
        match (self, other) {
            (TypeNode::Scalar(a), TypeNode::Scalar(b)) => a.same_as(b),
            (TypeNode::Struct(a), TypeNode::Struct(b)) => a.same_fields(b),
            (TypeNode::Array(a), TypeNode::Array(b)) => a.element.same_type(&b.element),
            (TypeNode::Map(a), TypeNode::Map(b)) => a.value.same_type(&b.value),
            _ => false,
        }
    }

    /// Forgiving comparison without side effects. `Some` carries the union
    /// of both operands when they are compatible.
    pub fn unify(&self, other: &TypeNode) -> Option<TypeNode> {
        if self.is_any() {
            return Some(other.clone());
        }
        if other.is_any() {
            return Some(self.clone());
        }
        match (self, other) {
            (TypeNode::Scalar(a), TypeNode::Scalar(b)) => a.same_as(b).then(|| self.clone()),
            (TypeNode::Struct(a), TypeNode::Struct(b)) => a.unify(b).map(TypeNode::Struct),
            (TypeNode::Array(a), TypeNode::Array(b)) => a.unify(b).map(TypeNode::Array),
            (TypeNode::Map(a), TypeNode::Map(b)) => a.unify(b).map(TypeNode::Map),
            _ => None,
        }
    }

    /// Forgiving comparison that finalizes the widening: when it returns
    /// `true` and both sides are structs, `self` now holds the union of
    /// both field sets. `other` is never touched.
    pub fn same_type_forgiving(&mut self, other: &TypeNode) -> bool {
        match self.unify(other) {
            Some(merged) => {
                *self = merged;
                true
            }
            None => false,
        }
    }

    // ------------------------------ Merge -------------------------------- //

    /// Merge `other` into `self`. `Any` on either side is absorbed. Struct
    /// merge is a union of fields, so it is not commutative on naming.
    pub fn merge(&mut self, other: TypeNode) -> Result<()> {
        if other.is_any() {
            return Ok(());
        }
        if self.is_any() {
            *self = other;
            return Ok(());
        }
        match (&mut *self, other) {
            (TypeNode::Scalar(a), TypeNode::Scalar(b)) if a.token == b.token => {
                if a.import.is_none() {
                    a.import = b.import;
                }
                Ok(())
            }
            (TypeNode::Struct(a), TypeNode::Struct(b)) => a.merge(b),
            (TypeNode::Array(a), TypeNode::Array(b)) => a.merge(b),
            (TypeNode::Map(a), TypeNode::Map(b)) => a.merge(b),
            (left, right) => Err(incompatible(left, &right)),
        }
    }

    /// Rewrite struct names in this subtree so the longest matching prefix
    /// out of `from` becomes `to`. Imported structs keep their names.
    pub(crate) fn rename_prefix(&mut self, from: &[String], to: &str) {
        match self {
            TypeNode::Scalar(_) => {}
            TypeNode::Struct(s) => s.rename_prefix(from, to),
            TypeNode::Array(a) => a.element.rename_prefix(from, to),
            TypeNode::Map(m) => m.value.rename_prefix(from, to),
        }
    }
}

pub(crate) fn incompatible(left: &TypeNode, right: &TypeNode) -> Error {
    Error::IncompatibleTypes {
        left: left.kind(),
        right: right.kind(),
        left_name: left.display_name(),
        right_name: right.display_name(),
    }
}

// ------------------------------- Tests ------------------------------------ //
