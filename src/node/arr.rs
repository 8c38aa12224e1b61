use serde::{Deserialize, Serialize};

use super::TypeNode;
use crate::error::Result;

/// Union of every element observed. An empty source array wraps `Any`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: Box<TypeNode>,
}

impl ArrayType {
    pub fn new(element: TypeNode) -> Self {
        Self { element: Box::new(element) }
    }

    pub(super) fn unify(&self, other: &Self) -> Option<Self> {
        self.element.unify(&other.element).map(Self::new)
    }

    pub(super) fn merge(&mut self, other: Self) -> Result<()> {
        self.element.merge(*other.element)
    }
}
