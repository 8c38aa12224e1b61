//! Error types for the schema synthesis engine.
//!
//! Every engine operation reports failures synchronously through [`Error`];
//! nothing is retried and no partial result is recovered. A node that was
//! the target of a failed merge or cleanup must not be reused.

use thiserror::Error;

use crate::node::TypeKind;
use crate::scalar::ScalarToken;

#[derive(Error, Debug)]
pub enum Error {
    /// Empty top-level input, or an empty top-level object.
    #[error("no data to infer types from")]
    NoData,

    #[error("can't merge {left} `{left_name}` with {right} `{right_name}`")]
    IncompatibleTypes {
        left: TypeKind,
        right: TypeKind,
        left_name: String,
        right_name: String,
    },

    #[error("recognizers can only target string or float64 scalars, not `{target}`")]
    UnsupportedRecognizerTarget { target: ScalarToken },

    /// Maps are derived by cleanup and are never eligible for another pass.
    #[error("cleanup is not supported on derived map types")]
    CleanupNotSupportedOnDerivedType,

    #[error("failed to read source `{name}`: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode JSON from `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid seed types: {message}")]
    Seed { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
