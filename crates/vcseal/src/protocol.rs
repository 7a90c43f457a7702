//! The two-phase inscription protocol: commit, then reveal.
//!
//! A commit transaction locks funds at a fresh receiving address; the reveal
//! transaction spends that output and embeds the envelope in a null-data
//! output. Both steps are one-way ledger actions. They are not atomic: a
//! reveal failure after a successful commit leaves the funds at the commit
//! address, to be recovered out-of-band.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use vcseal_ledger::{
    finalize_psbt, get_raw_transaction, send_raw_transaction, wallet_create_funded_psbt, Address,
    LedgerRpc, Signer, Txid,
};

use crate::error::{ProtocolError, Result};

/// One satoshi-denominated amount expressed in whole coins for the wallet.
fn sats_to_coins(sats: u64) -> f64 {
    sats as f64 / 100_000_000.0
}

/// An unspent commit output waiting to fund a reveal.
///
/// Deliberately not `Clone`: a commit reference is consumed by value in
/// [`InscriptionProtocol::reveal`], so one commit funds at most one reveal.
#[derive(Debug)]
pub struct CommitReference {
    /// The commit transaction.
    pub txid: Txid,
    /// The address the funds were committed to.
    pub address: Address,
    /// Committed amount, in satoshis.
    pub amount_sats: u64,
}

/// Identifier of a published inscription: the reveal transaction's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InscriptionId(Txid);

impl InscriptionId {
    pub fn new(txid: Txid) -> Self {
        Self(txid)
    }

    pub fn from_str_id(s: impl Into<String>) -> Self {
        Self(Txid::new(s))
    }

    pub fn txid(&self) -> &Txid {
        &self.0
    }
}

impl fmt::Display for InscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Orchestrates the commit and reveal transactions.
///
/// Lifecycle per inscription: Draft → Committed → Revealed, driven by the
/// caller composing `commit` then `reveal`. There is no rollback state.
pub struct InscriptionProtocol<L: LedgerRpc, S: Signer> {
    ledger: Arc<L>,
    signer: S,
}

impl<L: LedgerRpc, S: Signer> InscriptionProtocol<L, S> {
    pub fn new(ledger: Arc<L>, signer: S) -> Self {
        Self { ledger, signer }
    }

    /// Broadcast a funding transaction paying `amount_sats` to a fresh
    /// receiving address.
    ///
    /// Broadcast failures surface to the caller; nothing is retried.
    pub async fn commit(&self, amount_sats: u64) -> Result<CommitReference> {
        let address = self.signer.receiving_address()?;

        let network = self.signer.network();
        if !network.matches_address(address.as_str()) {
            return Err(ProtocolError::AddressNetworkMismatch { address, network });
        }

        let mut outputs = serde_json::Map::new();
        outputs.insert(address.to_string(), json!(sats_to_coins(amount_sats)));

        let funded = wallet_create_funded_psbt(
            &*self.ledger,
            json!([]),
            Value::Object(outputs),
            json!({ "replaceable": true, "changePosition": 1 }),
        )
        .await?;

        let finalized = finalize_psbt(&*self.ledger, &funded.psbt).await?;
        if !finalized.complete {
            return Err(ProtocolError::CommitFinalizationFailed);
        }
        let hex = finalized.hex.ok_or(ProtocolError::CommitFinalizationFailed)?;

        let txid = send_raw_transaction(&*self.ledger, &hex).await?;
        tracing::info!(%txid, %address, amount_sats, "commit transaction broadcast");

        Ok(CommitReference {
            txid,
            address,
            amount_sats,
        })
    }

    /// Spend the commit output into a transaction embedding `payload_hex`
    /// as a null-data output, with change back to the wallet.
    ///
    /// Consumes the commit reference: it funds exactly one reveal.
    pub async fn reveal(&self, commit: CommitReference, payload_hex: &str) -> Result<InscriptionId> {
        let commit_tx = get_raw_transaction(&*self.ledger, &commit.txid).await?;

        if commit_tx.vout.is_empty() {
            return Err(ProtocolError::NoOutputsInCommitTx { txid: commit.txid });
        }

        // Select the funding output by address. Funding calls may reorder
        // outputs, so a fixed index cannot be trusted.
        let funding = commit_tx
            .vout
            .iter()
            .find(|out| out.pays_to(commit.address.as_str()))
            .ok_or_else(|| ProtocolError::CommitOutputNotFound {
                txid: commit.txid.clone(),
                address: commit.address.clone(),
            })?;

        let funded = wallet_create_funded_psbt(
            &*self.ledger,
            json!([{ "txid": commit.txid.as_str(), "vout": funding.n }]),
            json!({ "data": payload_hex }),
            json!({ "changePosition": 1, "include_unsafe": true }),
        )
        .await?;

        let finalized = finalize_psbt(&*self.ledger, &funded.psbt).await?;
        if !finalized.complete {
            return Err(ProtocolError::RevealFinalizationFailed);
        }
        let hex = finalized.hex.ok_or(ProtocolError::RevealFinalizationFailed)?;

        let txid = send_raw_transaction(&*self.ledger, &hex).await?;
        tracing::info!(%txid, commit_txid = %commit.txid, "reveal transaction broadcast");

        Ok(InscriptionId::new(txid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sats_to_coins() {
        assert_eq!(sats_to_coins(100_000_000), 1.0);
        assert_eq!(sats_to_coins(10_000), 0.0001);
        assert_eq!(sats_to_coins(0), 0.0);
    }

    #[test]
    fn test_inscription_id_display() {
        let id = InscriptionId::from_str_id("ab".repeat(32));
        assert_eq!(id.to_string(), "ab".repeat(32));
        assert_eq!(id.txid().as_str(), "ab".repeat(32));
    }
}
