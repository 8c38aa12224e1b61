//! One generation run: decode → infer → cleanup → lower.
use serde_json::Value;

use crate::error::Result;
use crate::inference::Parser;
use crate::ir::Schema;
use crate::lower::lower_to_ir;
use crate::node::TypeNode;
use crate::options::GeneratorOptions;
use crate::source::Source;
use crate::universe::{EmptyUniverse, Registry, Universe};

/// Final graph plus its emitter view.
#[derive(Debug, Clone)]
pub struct Generation {
    pub root: TypeNode,
    pub schema: Schema,
}

/// Owns the options and the universe. The universe outlives individual
/// `generate` calls, so later documents reuse shapes from earlier ones.
pub struct Generator {
    options: GeneratorOptions,
    universe: Box<dyn Universe>,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        let universe: Box<dyn Universe> = if options.dedupe {
            Box::new(Registry::new())
        } else {
            Box::new(EmptyUniverse)
        };
        Self { options, universe }
    }

    /// Start from existing types instead of an empty registry.
    ///
    /// Seeding always canonicalizes through `seed`, so `options.dedupe` is
    /// ignored here.
    pub fn with_seed(options: GeneratorOptions, seed: Registry) -> Self {
        if !options.dedupe {
            tracing::warn!(seeded = seed.len(), "dedupe is off but a seed was given; using the seed");
        }
        Self { options, universe: Box::new(seed) }
    }

    pub fn universe(&self) -> &dyn Universe {
        self.universe.as_ref()
    }

    pub fn generate(&mut self, source: &mut dyn Source) -> Result<Generation> {
        let value = source.decode()?;
        let name = source.name().to_string();
        self.generate_value(&name, &value)
    }

    pub fn generate_value(&mut self, name: &str, value: &Value) -> Result<Generation> {
        let mut root = Parser::new(&self.options.scalars, self.universe.as_mut()).parse_root(name, value)?;
        tracing::debug!(root = %root.display_name(), registered = self.universe.len(), "inferred");

        if self.options.cleanup {
            root = self.options.cleaner.cleanup(root)?;
        }

        let records = match value {
            Value::Array(xs) if self.options.unique_lookup => Some(xs.as_slice()),
            _ => None,
        };
        let schema = lower_to_ir(&root, records);
        Ok(Generation { root, schema })
    }
}
