use serde::{Deserialize, Serialize};

use super::TypeNode;
use crate::error::Result;

/// Uniform value type behind an implicit string key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapType {
    pub value: Box<TypeNode>,
}

impl MapType {
    pub fn new(value: TypeNode) -> Self {
        Self { value: Box::new(value) }
    }

    pub(super) fn unify(&self, other: &Self) -> Option<Self> {
        self.value.unify(&other.value).map(Self::new)
    }

    pub(super) fn merge(&mut self, other: Self) -> Result<()> {
        self.value.merge(*other.value)
    }
}
