//! Schema synthesis from semi-structured data.
//!
//! Feed decoded JSON in, get back a de-duplicated type graph (structs,
//! arrays, maps, scalars) plus a flat declaration list an emitter can turn
//! into source code for its target language.
//!
//! ```no_run
//! use shapegen::{Generator, GeneratorOptions};
//!
//! let value = serde_json::json!([{"id": "a", "tags": ["x"]}, {"id": "b"}]);
//! let out = Generator::new(GeneratorOptions::new().with_timestamps())
//!     .generate_value("users", &value)?;
//! println!("{}", serde_json::to_string_pretty(&out.schema).unwrap());
//! # Ok::<(), shapegen::Error>(())
//! ```
pub mod cleanup;
pub mod error;
pub mod generator;
pub mod inference;
pub mod ir;
pub mod lower;
pub mod naming;
pub mod node;
pub mod options;
pub mod scalar;
pub mod source;
pub mod uniqueness;
pub mod universe;

pub use cleanup::{Cleaner, DefaultPromotionPolicy, NoPromotion, PromotionPolicy};
pub use error::{Error, Result};
pub use generator::{Generation, Generator};
pub use inference::{infer, Parser};
pub use ir::{Declaration, FieldDecl, Schema, TypeRef};
pub use node::{ArrayType, Field, MapType, StructType, TypeKind, TypeNode};
pub use options::GeneratorOptions;
pub use scalar::{Recognizer, Scalar, ScalarRegistry, ScalarToken};
pub use source::{BytesSource, FileSource, Source};
pub use uniqueness::{unique_fields, UniqueField};
pub use universe::{EmptyUniverse, Registry, Universe};
