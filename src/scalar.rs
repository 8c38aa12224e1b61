//! Scalar type registry.
//!
//! A fixed set of primitive tokens plus an ordered list of caller-registered
//! recognizers that may reclassify a string or number (e.g. an RFC 3339
//! string becomes a `Timestamp`). First matching recognizer wins.
pub mod recognize;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub use recognize::{BigNumberRecognizer, IntegerRecognizer, TimestampRecognizer, UriRecognizer};

// ------------------------------- Tokens ---------------------------------- //

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarToken {
    String,
    Bool,
    Int64,
    Float64,
    BigNumber,
    Timestamp,
    Uri,
    /// Unknown / interface placeholder. Equal to everything.
    Any,
}

impl ScalarToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarToken::String => "string",
            ScalarToken::Bool => "bool",
            ScalarToken::Int64 => "int64",
            ScalarToken::Float64 => "float64",
            ScalarToken::BigNumber => "big_number",
            ScalarToken::Timestamp => "timestamp",
            ScalarToken::Uri => "uri",
            ScalarToken::Any => "any",
        }
    }
}

impl fmt::Display for ScalarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scalar {
    pub token: ScalarToken,
    /// Origin tag for scalars whose declaration lives elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,
}

impl Scalar {
    pub const fn new(token: ScalarToken) -> Self {
        Self { token, import: None }
    }

    pub fn imported(token: ScalarToken, import: impl Into<String>) -> Self {
        Self { token, import: Some(import.into()) }
    }

    pub const fn any() -> Self { Self::new(ScalarToken::Any) }
    pub const fn string() -> Self { Self::new(ScalarToken::String) }
    pub const fn float64() -> Self { Self::new(ScalarToken::Float64) }
    pub const fn bool() -> Self { Self::new(ScalarToken::Bool) }

    pub fn is_any(&self) -> bool {
        self.token == ScalarToken::Any
    }

    /// Token equality, with `Any` absorbing everything.
    pub fn same_as(&self, other: &Scalar) -> bool {
        self.is_any() || other.is_any() || self.token == other.token
    }
}

// ----------------------------- Recognizers ------------------------------- //

/// Reclassifies a raw scalar value, or declines with `None`.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, value: &Value) -> Option<Scalar>;
}

impl<F> Recognizer for F
where
    F: Fn(&Value) -> Option<Scalar> + Send + Sync,
{
    fn recognize(&self, value: &Value) -> Option<Scalar> {
        self(value)
    }
}

#[derive(Clone, Default)]
pub struct ScalarRegistry {
    strings: Vec<Arc<dyn Recognizer>>,
    numbers: Vec<Arc<dyn Recognizer>>,
}

impl fmt::Debug for ScalarRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarRegistry")
            .field("strings", &self.strings.len())
            .field("numbers", &self.numbers.len())
            .finish()
    }
}

impl ScalarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a recognizer for `target`, which must be `String` or `Float64`.
    pub fn register<R>(&mut self, target: ScalarToken, recognizer: R) -> Result<()>
    where
        R: Recognizer + 'static,
    {
        match target {
            ScalarToken::String => self.strings.push(Arc::new(recognizer)),
            ScalarToken::Float64 => self.numbers.push(Arc::new(recognizer)),
            target => return Err(Error::UnsupportedRecognizerTarget { target }),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.numbers.is_empty()
    }

    /// Classify a raw scalar. Returns `None` for arrays and objects.
    pub fn classify(&self, value: &Value) -> Option<Scalar> {
        let (chain, fallback) = match value {
            Value::Null => return Some(Scalar::any()),
            Value::Bool(_) => return Some(Scalar::bool()),
            Value::String(_) => (&self.strings, Scalar::string()),
            Value::Number(_) => (&self.numbers, Scalar::float64()),
            Value::Array(_) | Value::Object(_) => return None,
        };
        let hit = chain.iter().find_map(|r| r.recognize(value));
        if let Some(scalar) = &hit {
            tracing::trace!(token = %scalar.token, "scalar reclassified by recognizer");
        }
        Some(hit.unwrap_or(fallback))
    }
}

// ------------------------------- Tests ------------------------------------ //
