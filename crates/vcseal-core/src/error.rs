//! Error types for the vcseal codec.

use thiserror::Error;

/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input document cannot be canonicalized.
    #[error("encoding error: {0}")]
    EncodingError(String),

    /// The canonical credential exceeds the configured size limit.
    #[error("payload too large: {size} bytes, limit is {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The payload is not valid hex or not a well-formed envelope structure.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The envelope carries a type tag other than "vc".
    #[error("invalid envelope type: expected \"vc\", got {found:?}")]
    InvalidEnvelopeType { found: String },

    /// The envelope names a hash algorithm this codec does not support.
    #[error("unsupported hash algorithm: {found:?}")]
    UnsupportedAlgorithm { found: String },

    /// The stored hash does not match the recomputed hash of the data.
    /// Always fatal, never auto-repaired.
    #[error("integrity mismatch: envelope says {expected}, data hashes to {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    /// The envelope data field does not parse back into a credential document.
    #[error("malformed credential: {0}")]
    MalformedVc(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
