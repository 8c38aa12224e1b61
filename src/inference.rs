//! Inference: walk a decoded JSON tree and build a [`TypeNode`] tree.
//!
//! - Objects become structs named after their path (`Parent` + `Key`) and are
//!   canonicalized through the universe.
//! - Arrays merge the types of every element into one element type. Nulls and
//!   empty containers carry no information and are skipped; an array with
//!   nothing left wraps `Any`.
//! - Scalars are classified by the scalar registry.
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::naming;
use crate::node::{StructType, TypeNode};
use crate::scalar::ScalarRegistry;
use crate::universe::Universe;

pub struct Parser<'a> {
    scalars: &'a ScalarRegistry,
    universe: &'a mut dyn Universe,
}

impl<'a> Parser<'a> {
    pub fn new(scalars: &'a ScalarRegistry, universe: &'a mut dyn Universe) -> Self {
        Self { scalars, universe }
    }

    /// Infer the type of a whole document. Empty top-level arrays and
    /// objects fail with [`Error::NoData`].
    pub fn parse_root(&mut self, name: &str, value: &Value) -> Result<TypeNode> {
        let name = naming::root_name(name);
        match value {
            Value::Array(xs) if xs.is_empty() => Err(Error::NoData),
            Value::Object(m) if m.is_empty() => Err(Error::NoData),
            _ => self.parse(&name, None, value),
        }
    }

    /// Infer one value found at `name`.
    ///
    /// A nested `{}` carries no fields to declare and becomes `Any`, the same
    /// as `null`, so a later non-empty sample of the same field wins the
    /// merge. Emitters therefore never see zero-field structs.
    fn parse(&mut self, name: &str, discriminator: Option<&str>, value: &Value) -> Result<TypeNode> {
        match value {
            Value::Object(m) if m.is_empty() => Ok(TypeNode::any()),
            Value::Object(m) => {
                let s = self.parse_object(name, discriminator, m)?;
                Ok(self.universe.find_or_register(s.into()))
            }
            Value::Array(xs) => self.parse_array(name, xs),
            scalar => Ok(self
                .scalars
                .classify(scalar)
                .map(TypeNode::Scalar)
                .unwrap_or_else(TypeNode::any)),
        }
    }

    fn parse_object(
        &mut self,
        name: &str,
        discriminator: Option<&str>,
        map: &Map<String, Value>,
    ) -> Result<StructType> {
        let mut out = StructType::new(name);
        out.discriminator = discriminator.map(str::to_string);
        for (key, v) in map {
            let (child, segment) = naming::child_name(name, key);
            let ty = self.parse(&child, Some(&segment), v)?;
            out.insert(key.clone(), ty);
        }
        Ok(out)
    }

    fn parse_array(&mut self, name: &str, xs: &[Value]) -> Result<TypeNode> {
        let item = naming::item_name(name);
        let mut merged: Option<TypeNode> = None;
        let mut seen = 0usize;

        for el in xs.iter().filter(|el| !is_void(el)) {
            seen += 1;
            // element structs are registered once, after merging
            let ty = match el {
                Value::Object(m) => TypeNode::Struct(self.parse_object(&item, None, m)?),
                other => self.parse(&item, None, other)?,
            };
            match merged.as_mut() {
                None => merged = Some(ty),
                Some(acc) => acc.merge(ty)?,
            }
        }

        if seen > 1 {
            tracing::debug!(array = %name, elements = seen, "merged array elements");
        }
        let element = match merged {
            Some(t @ TypeNode::Struct(_)) => self.universe.find_or_register(t),
            Some(t) => t,
            None => TypeNode::any(),
        };
        Ok(TypeNode::array_of(element))
    }
}

fn is_void(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(xs) => xs.is_empty(),
        _ => false,
    }
}

/// One-shot inference with a caller-owned universe.
pub fn infer(
    name: &str,
    value: &Value,
    scalars: &ScalarRegistry,
    universe: &mut dyn Universe,
) -> Result<TypeNode> {
    Parser::new(scalars, universe).parse_root(name, value)
}

// ------------------------------- Tests ------------------------------------ //
