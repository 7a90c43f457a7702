//! Canonical CBOR encoding for deterministic serialization.
//!
//! This module implements RFC 8949 Core Deterministic Encoding:
//! - Map keys sorted by encoded byte comparison, at every nesting level
//! - Integers use smallest valid encoding
//! - Floats always encode as 64-bit
//! - Definite lengths only
//!
//! The canonical encoding is critical: it ensures that the same credential
//! document produces identical bytes (and thus an identical hash) regardless
//! of the key order it arrived with.

use ciborium::value::Value;

use crate::credential::VerifiableCredential;
use crate::error::CodecError;

/// Maximum nesting depth accepted during canonicalization.
///
/// Deeper documents fail with [`CodecError::EncodingError`] instead of
/// overflowing the stack.
const MAX_DEPTH: usize = 128;

/// Encode a credential document to canonical CBOR bytes.
///
/// Two semantically equal documents (same keys and values, any key order,
/// at any nesting depth) encode to the same byte sequence.
pub fn canonical_bytes(vc: &VerifiableCredential) -> Result<Vec<u8>, CodecError> {
    let value = json_to_cbor(&serde_json::Value::Object(vc.as_map().clone()), 0)?;
    encode_canonical(&value)
}

/// Encode a CBOR Value to canonical bytes.
pub(crate) fn encode_canonical(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    encode_value_to(&mut buf, value)?;
    Ok(buf)
}

/// Convert a JSON value into a CBOR value tree.
///
/// Numbers keep their JSON type: integers become CBOR integers, everything
/// else becomes a 64-bit float.
pub(crate) fn json_to_cbor(value: &serde_json::Value, depth: usize) -> Result<Value, CodecError> {
    if depth > MAX_DEPTH {
        return Err(CodecError::EncodingError(format!(
            "nesting depth exceeds {MAX_DEPTH}"
        )));
    }

    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else {
                // serde_json guarantees finite floats
                Value::Float(n.as_f64().ok_or_else(|| {
                    CodecError::EncodingError(format!("unrepresentable number: {n}"))
                })?)
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => {
            let mut arr = Vec::with_capacity(items.len());
            for item in items {
                arr.push(json_to_cbor(item, depth + 1)?);
            }
            Value::Array(arr)
        }
        serde_json::Value::Object(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (k, v) in map {
                entries.push((Value::Text(k.clone()), json_to_cbor(v, depth + 1)?));
            }
            Value::Map(entries)
        }
    })
}

/// Convert a decoded CBOR value tree back into a JSON value.
///
/// Only the JSON-representable subset of CBOR is accepted; byte strings,
/// tags, and non-text map keys fail with [`CodecError::MalformedVc`].
pub(crate) fn cbor_to_json(value: &Value) -> Result<serde_json::Value, CodecError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => {
            let n: i128 = (*i).into();
            if let Ok(v) = i64::try_from(n) {
                serde_json::Value::Number(v.into())
            } else if let Ok(v) = u64::try_from(n) {
                serde_json::Value::Number(v.into())
            } else {
                return Err(CodecError::MalformedVc(format!(
                    "integer out of JSON range: {n}"
                )));
            }
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| CodecError::MalformedVc(format!("non-finite float: {f}")))?,
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            let mut arr = Vec::with_capacity(items.len());
            for item in items {
                arr.push(cbor_to_json(item)?);
            }
            serde_json::Value::Array(arr)
        }
        Value::Map(entries) => {
            let mut map = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                let key = match k {
                    Value::Text(s) => s.clone(),
                    other => {
                        return Err(CodecError::MalformedVc(format!(
                            "non-text map key: {other:?}"
                        )))
                    }
                };
                map.insert(key, cbor_to_json(v)?);
            }
            serde_json::Value::Object(map)
        }
        other => {
            return Err(CodecError::MalformedVc(format!(
                "CBOR value not representable as JSON: {other:?}"
            )))
        }
    })
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) -> Result<(), CodecError> {
    match value {
        Value::Integer(i) => {
            encode_integer(buf, *i);
        }
        Value::Bytes(b) => {
            encode_bytes(buf, b);
        }
        Value::Text(s) => {
            encode_text(buf, s);
        }
        Value::Array(arr) => {
            encode_array(buf, arr)?;
        }
        Value::Map(entries) => {
            encode_map_canonical(buf, entries)?;
        }
        Value::Bool(b) => {
            buf.push(if *b { 0xf5 } else { 0xf4 });
        }
        Value::Null => {
            buf.push(0xf6);
        }
        Value::Float(f) => {
            encode_float(buf, *f);
        }
        other => {
            return Err(CodecError::EncodingError(format!(
                "unsupported CBOR value type: {other:?}"
            )));
        }
    }
    Ok(())
}

/// Integers take major type 0 or 1 depending on sign.
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();

    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // Major type 1 carries -1 - n as its argument
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Write a major-type header, choosing the smallest argument width
/// that fits `n`.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    match n {
        0..=23 => buf.push(mt | n as u8),
        24..=0xff => {
            buf.push(mt | 24);
            buf.push(n as u8);
        }
        0x100..=0xffff => {
            buf.push(mt | 25);
            buf.extend_from_slice(&(n as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(mt | 26);
            buf.extend_from_slice(&(n as u32).to_be_bytes());
        }
        _ => {
            buf.push(mt | 27);
            buf.extend_from_slice(&n.to_be_bytes());
        }
    }
}

/// Byte string (major type 2): length header, then the bytes.
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Text string (major type 3): UTF-8 byte length header, then the bytes.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a float as a fixed 64-bit value (major type 7, ai 27).
///
/// Fixed width, not smallest-width: one unambiguous representation per value
/// is what determinism needs, and credentials carry few floats.
fn encode_float(buf: &mut Vec<u8>, f: f64) {
    buf.push(0xfb);
    buf.extend_from_slice(&f.to_be_bytes());
}

/// Encode an array (major type 4).
fn encode_array(buf: &mut Vec<u8>, arr: &[Value]) -> Result<(), CodecError> {
    encode_uint(buf, 4, arr.len() as u64);
    for item in arr {
        encode_value_to(buf, item)?;
    }
    Ok(())
}

/// Map (major type 5), entries ordered by encoded key bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) -> Result<(), CodecError> {
    // The ordering is over key encodings, so keys must be serialized
    // before sorting
    let mut key_value_pairs: Vec<(Vec<u8>, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut key_buf = Vec::new();
        encode_value_to(&mut key_buf, k)?;
        key_value_pairs.push((key_buf, v));
    }

    key_value_pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, key_value_pairs.len() as u64);
    for (key_bytes, value) in key_value_pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value)?;
    }
    Ok(())
}
