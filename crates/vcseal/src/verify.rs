//! Retrieval and re-validation of a published inscription.

use std::sync::Arc;

use vcseal_core::{EnvelopeCodec, VerifiableCredential};
use vcseal_ledger::{get_raw_transaction, LedgerRpc};

use crate::error::{ProtocolError, Result};
use crate::protocol::InscriptionId;

/// Outcome of verifying a published inscription. Purely derived, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// Envelope schema version.
    pub version: u64,
    /// Hash algorithm tag.
    pub alg: String,
    /// Hex of the verified payload hash.
    pub hash_hex: String,
    /// The recovered credential document.
    pub vc: VerifiableCredential,
}

/// Fetches an inscription's transaction, decodes the envelope, and checks
/// the credential's minimal shape.
pub struct RetrievalVerifier<L: LedgerRpc> {
    ledger: Arc<L>,
    codec: EnvelopeCodec,
}

impl<L: LedgerRpc> RetrievalVerifier<L> {
    pub fn new(ledger: Arc<L>, codec: EnvelopeCodec) -> Self {
        Self { ledger, codec }
    }

    /// Verify the inscription published at `id`.
    ///
    /// Codec failures (integrity mismatch, malformed envelope, wrong type
    /// or algorithm) propagate unchanged.
    pub async fn verify(&self, id: &InscriptionId) -> Result<VerificationResult> {
        let tx = get_raw_transaction(&*self.ledger, id.txid()).await?;

        // First null-data output carries the envelope
        let payload_hex = tx
            .vout
            .iter()
            .find_map(|out| out.null_data_hex())
            .ok_or_else(|| ProtocolError::NoDataOutput {
                txid: id.txid().clone(),
            })?;

        let decoded = self.codec.decode(payload_hex)?;

        let missing = decoded.vc.missing_fields();
        if !missing.is_empty() {
            return Err(ProtocolError::IncompleteCredential {
                missing: missing.into_iter().map(String::from).collect(),
            });
        }

        tracing::debug!(inscription_id = %id, hash = %decoded.hash_hex, "inscription verified");

        Ok(VerificationResult {
            version: decoded.version,
            alg: decoded.alg,
            hash_hex: decoded.hash_hex,
            vc: decoded.vc,
        })
    }
}
