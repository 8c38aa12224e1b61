//! Uniqueness analysis: which scalar fields of a record type hold a
//! different value in every record, and so could back an indexed lookup.
//!
//! The scan fails closed per field. A missing value, a value of the wrong
//! native kind, or a repeat disqualifies the field; other fields carry on.
use std::collections::HashSet;

use ordered_float::OrderedFloat;
use serde::Serialize;
use serde_json::Value;

use crate::node::{StructType, TypeNode};
use crate::scalar::ScalarToken;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UniqueField {
    pub key: String,
    pub token: ScalarToken,
}

/// Qualifying fields of `s`, in declaration order. Only string and float64
/// scalars are considered. No records means no unique fields.
pub fn unique_fields(s: &StructType, records: &[Value]) -> Vec<UniqueField> {
    if records.is_empty() {
        return Vec::new();
    }
    s.fields
        .values()
        .filter_map(|f| match &f.ty {
            TypeNode::Scalar(sc) if is_unique(&f.key, sc.token, records) => Some(UniqueField {
                key: f.key.clone(),
                token: sc.token,
            }),
            _ => None,
        })
        .collect()
}

fn is_unique(key: &str, token: ScalarToken, records: &[Value]) -> bool {
    let distinct = match token {
        ScalarToken::String => distinct_count(records, key, |v| v.as_str().map(str::to_string)),
        ScalarToken::Float64 => distinct_count(records, key, |v| v.as_f64().map(OrderedFloat)),
        _ => None,
    };
    distinct.is_some_and(|n| n == records.len())
}

/// Number of distinct values under `key`, or `None` if any record lacks
/// the key or holds a value `extract` rejects.
fn distinct_count<T, F>(records: &[Value], key: &str, extract: F) -> Option<usize>
where
    T: Eq + std::hash::Hash,
    F: Fn(&Value) -> Option<T>,
{
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let value = record.as_object()?.get(key)?;
        if !seen.insert(extract(value)?) {
            // a repeat can never reach the record count
            return None;
        }
    }
    Some(seen.len())
}
