//! Error types for the inscription protocol.

use thiserror::Error;

use vcseal_core::CodecError;
use vcseal_ledger::{Address, LedgerError, Network, Txid};

/// Errors that can occur during inscription and retrieval.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Envelope encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A ledger call failed.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The signer produced a receiving address that does not belong to
    /// the network it claims to derive for. Committing to it would send
    /// funds somewhere the reveal can never spend from.
    #[error("address {address} does not belong to network {network}")]
    AddressNetworkMismatch { address: Address, network: Network },

    /// The wallet could not finalize the commit funding transaction
    /// (typically insufficient funds).
    #[error("failed to finalize commit transaction")]
    CommitFinalizationFailed,

    /// The wallet could not finalize the reveal transaction. The commit
    /// funds stay locked at the commit address; recovery is manual.
    #[error("failed to finalize reveal transaction")]
    RevealFinalizationFailed,

    /// The commit transaction has no outputs at all.
    #[error("commit transaction {txid} has no outputs")]
    NoOutputsInCommitTx { txid: Txid },

    /// The commit transaction has outputs, but none paying the commit
    /// address this reveal expected to spend.
    #[error("commit transaction {txid} has no output paying {address}")]
    CommitOutputNotFound { txid: Txid, address: Address },

    /// The transaction behind an inscription id carries no null-data output.
    #[error("transaction {txid} has no null-data output")]
    NoDataOutput { txid: Txid },

    /// The decoded credential lacks required top-level fields.
    #[error("decoded credential is missing required fields: {}", missing.join(", "))]
    IncompleteCredential { missing: Vec<String> },
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
