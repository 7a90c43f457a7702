//! Error types for the ledger capability.

use thiserror::Error;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The node answered with a structured JSON-RPC error.
    #[error("rpc error from {method}: {message}")]
    Rpc { method: String, message: String },

    /// Transport-level failure (connection, timeout, HTTP status).
    /// Timeouts surface here; the client never retries on its own.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered success but the result did not have the
    /// expected shape.
    #[error("malformed response from {method}: {reason}")]
    MalformedResponse { method: String, reason: String },

    /// The signer capability could not produce a receiving address.
    #[error("signer error: {0}")]
    Signer(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
