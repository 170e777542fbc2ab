//! Document codec.
//!
//! Core crate avoids filesystem I/O. The codec works on in-memory bytes:
//! - decode: size-limited strict JSON into [`Database`]
//! - encode: [`Database`] into canonical pretty JSON
//!
//! Canonical form:
//! - every object's keys in lexicographic order, at every depth
//! - 2-space indentation, trailing newline
//! - absent optional fields omitted
//!
//! Encoding is a pure function of the value, so equal databases give
//! byte-identical output.

use serde_json::{Map, Value};

use crate::errors::{BpdbError, BpdbResult};
use crate::wire::Database;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode a snapshot, rejecting payloads larger than `max_bytes`.
pub fn decode_database(bytes: &[u8], max_bytes: usize) -> BpdbResult<Database> {
    if bytes.len() > max_bytes {
        return Err(BpdbError::invalid_argument(format!(
            "JSON payload too large ({} bytes > limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    serde_json::from_slice(bytes)
        .map_err(|e| BpdbError::serialization(format!("failed to decode database: {e}")))
}

/// Recursively rebuild `v` with object keys sorted.
pub fn canonical_value(v: Value) -> Value {
    match v {
        Value::Object(obj) => {
            let mut entries: Vec<(String, Value)> = obj.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonical_value(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonical_value).collect()),
        other => other,
    }
}

/// Encode a snapshot in canonical form.
pub fn encode_database(db: &Database) -> BpdbResult<Vec<u8>> {
    let value = serde_json::to_value(db)
        .map_err(|e| BpdbError::serialization(format!("failed to encode database: {e}")))?;
    let mut out = serde_json::to_vec_pretty(&canonical_value(value))
        .map_err(|e| BpdbError::serialization(format!("failed to write database: {e}")))?;
    out.push(b'\n');
    Ok(out)
}
