//! The integrity envelope around a canonical credential.
//!
//! Wire format: a CBOR map with five text keys — `v` (schema version), `t`
//! (literal "vc"), `alg` (literal "sha256"), `h` (32-byte hash), `d` (the
//! canonical credential bytes). The envelope is self-certifying: `h` is
//! recomputed from `d` on every decode and never trusted as stored.

use base64::Engine;
use ciborium::value::Value;
use sha2::{Digest, Sha256};

use crate::canonical::{canonical_bytes, cbor_to_json, encode_canonical};
use crate::credential::VerifiableCredential;
use crate::error::{CodecError, Result};

/// Envelope schema version written by this codec.
pub const SCHEMA_VERSION: u64 = 1;

/// Envelope type tag. Anything else is rejected on decode.
pub const ENVELOPE_TYPE: &str = "vc";

/// Hash algorithm tag. The only algorithm this codec supports.
pub const HASH_ALG: &str = "sha256";

/// Default limit on the canonical credential size, in bytes.
pub const DEFAULT_MAX_VC_SIZE: usize = 4096;

/// Envelope field keys.
mod keys {
    pub const VERSION: &str = "v";
    pub const TYPE: &str = "t";
    pub const ALG: &str = "alg";
    pub const HASH: &str = "h";
    pub const DATA: &str = "d";
}

/// A serialized envelope ready for on-chain embedding.
///
/// The hex and base64 forms are derived from the same envelope bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    canonical_vc: Vec<u8>,
    envelope: Vec<u8>,
    hash: [u8; 32],
}

impl Payload {
    /// The raw serialized envelope.
    pub fn envelope_bytes(&self) -> &[u8] {
        &self.envelope
    }

    /// The canonical credential bytes the envelope wraps.
    pub fn canonical_vc(&self) -> &[u8] {
        &self.canonical_vc
    }

    /// The SHA-256 hash of the canonical credential bytes.
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    /// The hash as a 64-character hex string.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// The envelope as a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.envelope)
    }

    /// The envelope as a standard base64 string.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.envelope)
    }
}

/// A decoded and integrity-checked envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    /// Schema version stored in the envelope.
    pub version: u64,
    /// Hash algorithm tag (always "sha256" after a successful decode).
    pub alg: String,
    /// Hex of the verified hash.
    pub hash_hex: String,
    /// The credential document recovered from the canonical bytes.
    pub vc: VerifiableCredential,
}

/// Builds and parses integrity envelopes.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    max_vc_size: usize,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VC_SIZE)
    }
}

impl EnvelopeCodec {
    /// Create a codec with a custom canonical-size limit.
    pub fn new(max_vc_size: usize) -> Self {
        Self { max_vc_size }
    }

    /// The configured canonical-size limit in bytes.
    pub fn max_vc_size(&self) -> usize {
        self.max_vc_size
    }

    /// Encode a credential into an envelope payload.
    ///
    /// Canonicalizes the document, enforces the size limit, hashes the
    /// canonical bytes, and serializes the five-field envelope.
    pub fn encode(&self, vc: &VerifiableCredential) -> Result<Payload> {
        let data = canonical_bytes(vc)?;

        if data.len() > self.max_vc_size {
            return Err(CodecError::PayloadTooLarge {
                size: data.len(),
                limit: self.max_vc_size,
            });
        }

        let hash: [u8; 32] = Sha256::digest(&data).into();

        let envelope_value = Value::Map(vec![
            (Value::Text(keys::VERSION.into()), Value::Integer(SCHEMA_VERSION.into())),
            (Value::Text(keys::TYPE.into()), Value::Text(ENVELOPE_TYPE.into())),
            (Value::Text(keys::ALG.into()), Value::Text(HASH_ALG.into())),
            (Value::Text(keys::HASH.into()), Value::Bytes(hash.to_vec())),
            (Value::Text(keys::DATA.into()), Value::Bytes(data.clone())),
        ]);
        let envelope = encode_canonical(&envelope_value)?;

        Ok(Payload {
            canonical_vc: data,
            envelope,
            hash,
        })
    }

    /// Decode an envelope from its hex form and verify its integrity.
    pub fn decode(&self, payload_hex: &str) -> Result<DecodedEnvelope> {
        let raw = hex::decode(payload_hex)
            .map_err(|e| CodecError::MalformedPayload(format!("invalid hex: {e}")))?;
        self.decode_bytes(&raw)
    }

    /// Decode an envelope from raw bytes and verify its integrity.
    pub fn decode_bytes(&self, raw: &[u8]) -> Result<DecodedEnvelope> {
        let value: Value = ciborium::from_reader(raw)
            .map_err(|e| CodecError::MalformedPayload(format!("invalid CBOR: {e}")))?;

        let entries = match value {
            Value::Map(entries) => entries,
            _ => {
                return Err(CodecError::MalformedPayload(
                    "envelope must be a CBOR map".into(),
                ))
            }
        };

        // Field order is not significant on decode
        let get = |key: &str| {
            entries
                .iter()
                .find(|(k, _)| matches!(k, Value::Text(t) if t == key))
                .map(|(_, v)| v)
        };

        let envelope_type = match get(keys::TYPE) {
            Some(Value::Text(t)) => t.clone(),
            _ => {
                return Err(CodecError::MalformedPayload(
                    "missing or non-text envelope type".into(),
                ))
            }
        };
        if envelope_type != ENVELOPE_TYPE {
            return Err(CodecError::InvalidEnvelopeType {
                found: envelope_type,
            });
        }

        let alg = match get(keys::ALG) {
            Some(Value::Text(a)) => a.clone(),
            _ => {
                return Err(CodecError::MalformedPayload(
                    "missing or non-text hash algorithm".into(),
                ))
            }
        };
        if alg != HASH_ALG {
            return Err(CodecError::UnsupportedAlgorithm { found: alg });
        }

        let version = match get(keys::VERSION) {
            Some(Value::Integer(i)) => u64::try_from(i128::from(*i))
                .map_err(|_| CodecError::MalformedPayload("negative schema version".into()))?,
            _ => {
                return Err(CodecError::MalformedPayload(
                    "missing or non-integer schema version".into(),
                ))
            }
        };

        let stored_hash: [u8; 32] = match get(keys::HASH) {
            Some(Value::Bytes(b)) => b.as_slice().try_into().map_err(|_| {
                CodecError::MalformedPayload(format!("hash must be 32 bytes, got {}", b.len()))
            })?,
            _ => {
                return Err(CodecError::MalformedPayload(
                    "missing or non-bytes hash".into(),
                ))
            }
        };

        let data = match get(keys::DATA) {
            Some(Value::Bytes(b)) => b.clone(),
            _ => {
                return Err(CodecError::MalformedPayload(
                    "missing or non-bytes data".into(),
                ))
            }
        };

        // The trust boundary: never accept the stored hash on faith
        let actual: [u8; 32] = Sha256::digest(&data).into();
        if actual != stored_hash {
            return Err(CodecError::IntegrityMismatch {
                expected: hex::encode(stored_hash),
                actual: hex::encode(actual),
            });
        }

        let vc_cbor: Value = ciborium::from_reader(data.as_slice())
            .map_err(|e| CodecError::MalformedVc(format!("data is not valid CBOR: {e}")))?;
        let vc = VerifiableCredential::from_value(cbor_to_json(&vc_cbor)?)?;

        Ok(DecodedEnvelope {
            version,
            alg,
            hash_hex: hex::encode(stored_hash),
            vc,
        })
    }
}
