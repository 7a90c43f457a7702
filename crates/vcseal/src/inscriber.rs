//! The inscription workflow: encode → commit → reveal, and verify.

use std::sync::Arc;

use vcseal_core::{EnvelopeCodec, VerifiableCredential};
use vcseal_ledger::{LedgerRpc, Signer};

use crate::config::InscriberConfig;
use crate::error::Result;
use crate::protocol::{InscriptionId, InscriptionProtocol};
use crate::verify::{RetrievalVerifier, VerificationResult};

/// What an inscription run produces.
#[derive(Debug, Clone)]
pub struct InscriptionRecord {
    /// Handle for later retrieval.
    pub inscription_id: InscriptionId,
    /// Hex of the credential's payload hash.
    pub hash_hex: String,
}

/// High-level API tying the codec, the protocol, and the verifier together.
pub struct Inscriber<L: LedgerRpc, S: Signer> {
    codec: EnvelopeCodec,
    protocol: InscriptionProtocol<L, S>,
    verifier: RetrievalVerifier<L>,
    config: InscriberConfig,
}

impl<L: LedgerRpc, S: Signer> Inscriber<L, S> {
    pub fn new(ledger: Arc<L>, signer: S, config: InscriberConfig) -> Self {
        let codec = EnvelopeCodec::new(config.max_vc_size);
        Self {
            protocol: InscriptionProtocol::new(Arc::clone(&ledger), signer),
            verifier: RetrievalVerifier::new(ledger, codec.clone()),
            codec,
            config,
        }
    }

    /// The codec this inscriber encodes and decodes with.
    pub fn codec(&self) -> &EnvelopeCodec {
        &self.codec
    }

    /// Publish a credential: encode it, commit funds, reveal the envelope.
    ///
    /// If the reveal step fails after a successful commit, the committed
    /// funds remain at the commit address; there is no automatic refund.
    pub async fn inscribe(&self, vc: &VerifiableCredential) -> Result<InscriptionRecord> {
        let payload = self.codec.encode(vc)?;
        tracing::info!(
            canonical_bytes = payload.canonical_vc().len(),
            hash = %payload.hash_hex(),
            "credential encoded"
        );

        let commit = self.protocol.commit(self.config.commit_amount_sats).await?;
        let inscription_id = self.protocol.reveal(commit, &payload.to_hex()).await?;
        tracing::info!(%inscription_id, "inscription created");

        Ok(InscriptionRecord {
            inscription_id,
            hash_hex: payload.hash_hex(),
        })
    }

    /// Retrieve and re-validate a published inscription.
    pub async fn verify(&self, id: &InscriptionId) -> Result<VerificationResult> {
        self.verifier.verify(id).await
    }
}
