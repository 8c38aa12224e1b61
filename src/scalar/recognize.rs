//! Built-in recognizers. None of them are active until registered.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Recognizer, Scalar, ScalarToken};

pub const TIME_IMPORT: &str = "time";
pub const BIG_NUMBER_IMPORT: &str = "bignum";

static URI_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.\-]*://\S+|mailto:\S+@\S+|tel:\+?[0-9\-\s]+)$")
        .expect("static regex")
});

/// RFC 3339 strings → `Timestamp`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimestampRecognizer;

impl Recognizer for TimestampRecognizer {
    fn recognize(&self, value: &Value) -> Option<Scalar> {
        let s = value.as_str()?;
        chrono::DateTime::parse_from_rfc3339(s).ok()?;
        Some(Scalar::imported(ScalarToken::Timestamp, TIME_IMPORT))
    }
}

/// Scheme-prefixed strings → `Uri`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UriRecognizer;

impl Recognizer for UriRecognizer {
    fn recognize(&self, value: &Value) -> Option<Scalar> {
        let s = value.as_str()?;
        URI_SCHEME.is_match(s).then(|| Scalar::new(ScalarToken::Uri))
    }
}

/// Integral numbers that fit in `i64` → `Int64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegerRecognizer;

impl Recognizer for IntegerRecognizer {
    fn recognize(&self, value: &Value) -> Option<Scalar> {
        let n = value.as_number()?;
        n.as_i64().map(|_| Scalar::new(ScalarToken::Int64))
    }
}

/// Integral numbers that overflow `i64` → `BigNumber`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BigNumberRecognizer;

impl Recognizer for BigNumberRecognizer {
    fn recognize(&self, value: &Value) -> Option<Scalar> {
        let n = value.as_number()?;
        if n.as_i64().is_some() {
            return None;
        }
        n.as_u64().map(|_| Scalar::imported(ScalarToken::BigNumber, BIG_NUMBER_IMPORT))
    }
}
