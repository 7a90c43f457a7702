//! # vcseal Core
//!
//! Pure primitives for vcseal: credential documents, canonical CBOR, and the
//! integrity envelope.
//!
//! This crate contains no I/O and no networking. It is pure computation over
//! credential documents and byte strings.
//!
//! ## Key Types
//!
//! - [`VerifiableCredential`] - A JSON credential document
//! - [`EnvelopeCodec`] - Builds and parses the hash-integrity envelope
//! - [`Payload`] - A serialized envelope ready for on-chain embedding
//!
//! ## Canonicalization
//!
//! Credential documents are encoded using deterministic CBOR so the same
//! logical document always hashes to the same digest. See [`canonical`].

pub mod canonical;
pub mod credential;
pub mod envelope;
pub mod error;

pub use canonical::canonical_bytes;
pub use credential::{VerifiableCredential, REQUIRED_FIELDS};
pub use envelope::{
    DecodedEnvelope, EnvelopeCodec, Payload, DEFAULT_MAX_VC_SIZE, ENVELOPE_TYPE, HASH_ALG,
    SCHEMA_VERSION,
};
pub use error::{CodecError, Result};
