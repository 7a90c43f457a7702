//! An in-process ledger simulator.
//!
//! [`MemoryLedger`] implements [`LedgerRpc`] for the four wallet methods the
//! protocol uses, with regtest-like behavior: funding is always available,
//! broadcast transactions become fetchable, and spent outputs are tracked so
//! an outpoint cannot fund two transactions.
//!
//! Fault injection covers the protocol's partial-failure points: refusing
//! PSBT finalization and broadcasting transactions with no outputs.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;

/// Address the simulator sends change to.
const CHANGE_ADDRESS: &str = "bcrt1qmemledgerchange0000000000000000000000";

/// A funded-but-unbroadcast transaction in flight.
#[derive(Debug, Clone)]
struct PsbtRecord {
    inputs: Vec<(String, u64)>,
    outputs: Value,
}

#[derive(Debug, Default)]
struct Inner {
    /// Broadcast transactions in verbose form, by txid.
    transactions: HashMap<String, Value>,
    /// PSBTs handed out by walletcreatefundedpsbt, by token.
    psbts: HashMap<String, PsbtRecord>,
    /// Raw hex tokens produced by finalizepsbt, mapped back to their PSBT.
    finalized: HashMap<String, String>,
    /// Outpoints already consumed by a broadcast transaction.
    spent: HashSet<(String, u64)>,
    next_psbt: u64,
}

/// In-memory regtest simulator.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
    refuse_finalization: bool,
    drop_outputs: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every finalizepsbt call report an incomplete transaction.
    pub fn refuse_finalization(mut self) -> Self {
        self.refuse_finalization = true;
        self
    }

    /// Broadcast transactions with an empty output list.
    pub fn drop_outputs(mut self) -> Self {
        self.drop_outputs = true;
        self
    }

    fn rpc_err(method: &str, message: &str) -> LedgerError {
        LedgerError::Rpc {
            method: method.to_string(),
            message: message.to_string(),
        }
    }

    fn parse_inputs(method: &str, inputs: &Value) -> Result<Vec<(String, u64)>> {
        let items = inputs
            .as_array()
            .ok_or_else(|| Self::rpc_err(method, "inputs must be an array"))?;

        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            let txid = item
                .get("txid")
                .and_then(|t| t.as_str())
                .ok_or_else(|| Self::rpc_err(method, "input missing txid"))?;
            let vout = item
                .get("vout")
                .and_then(|v| v.as_u64())
                .ok_or_else(|| Self::rpc_err(method, "input missing vout"))?;
            parsed.push((txid.to_string(), vout));
        }
        Ok(parsed)
    }

    /// Render the stored outputs object as verbose-form vout entries.
    fn build_vout(outputs: &Value) -> Vec<Value> {
        let mut vout = Vec::new();
        let mut n = 0u32;

        if let Some(map) = outputs.as_object() {
            for (key, value) in map {
                if key == "data" {
                    let data_hex = value.as_str().unwrap_or_default();
                    vout.push(json!({
                        "value": 0.0,
                        "n": n,
                        "scriptPubKey": {
                            "asm": format!("OP_RETURN {data_hex}"),
                            "hex": format!("6a{data_hex}"),
                            "type": "nulldata",
                        }
                    }));
                } else {
                    vout.push(json!({
                        "value": value.as_f64().unwrap_or(0.0),
                        "n": n,
                        "scriptPubKey": {
                            "asm": format!("0 {key}"),
                            "hex": "0014",
                            "type": "witness_v0_keyhash",
                            "address": key,
                        }
                    }));
                }
                n += 1;
            }
        }

        // The wallet always appends change
        vout.push(json!({
            "value": 0.001,
            "n": n,
            "scriptPubKey": {
                "asm": format!("0 {CHANGE_ADDRESS}"),
                "hex": "0014",
                "type": "witness_v0_keyhash",
                "address": CHANGE_ADDRESS,
            }
        }));

        vout
    }

    async fn create_funded_psbt(&self, params: &Value) -> Result<Value> {
        const METHOD: &str = "walletcreatefundedpsbt";
        let inputs = Self::parse_inputs(METHOD, params.get(0).unwrap_or(&json!([])))?;
        let outputs = params.get(1).cloned().unwrap_or_else(|| json!({}));

        let mut inner = self.inner.lock().await;
        inner.next_psbt += 1;
        let token = format!("psbt:{}", inner.next_psbt);
        inner.psbts.insert(token.clone(), PsbtRecord { inputs, outputs });

        Ok(json!({ "psbt": token, "fee": 0.00001, "changepos": 1 }))
    }

    async fn finalize(&self, params: &Value) -> Result<Value> {
        const METHOD: &str = "finalizepsbt";
        let token = params
            .get(0)
            .and_then(|p| p.as_str())
            .ok_or_else(|| Self::rpc_err(METHOD, "missing psbt"))?;

        let mut inner = self.inner.lock().await;
        if !inner.psbts.contains_key(token) {
            return Err(Self::rpc_err(METHOD, "unknown psbt"));
        }

        if self.refuse_finalization {
            return Ok(json!({ "complete": false }));
        }

        let hex = format!("raw:{token}");
        inner.finalized.insert(hex.clone(), token.to_string());
        Ok(json!({ "complete": true, "hex": hex }))
    }

    async fn broadcast(&self, params: &Value) -> Result<Value> {
        const METHOD: &str = "sendrawtransaction";
        let hex = params
            .get(0)
            .and_then(|p| p.as_str())
            .ok_or_else(|| Self::rpc_err(METHOD, "missing raw transaction"))?;

        let mut inner = self.inner.lock().await;
        let token = inner
            .finalized
            .get(hex)
            .cloned()
            .ok_or_else(|| Self::rpc_err(METHOD, "TX decode failed"))?;
        let record = inner
            .psbts
            .get(&token)
            .cloned()
            .ok_or_else(|| Self::rpc_err(METHOD, "unknown psbt"))?;

        // Inputs must exist and be unspent
        for (txid, vout) in &record.inputs {
            if !inner.transactions.contains_key(txid)
                || inner.spent.contains(&(txid.clone(), *vout))
            {
                return Err(Self::rpc_err(METHOD, "bad-txns-inputs-missingorspent"));
            }
        }
        for outpoint in record.inputs {
            inner.spent.insert(outpoint);
        }

        let txid = hex::encode(Sha256::digest(hex.as_bytes()));
        let vout = if self.drop_outputs {
            Vec::new()
        } else {
            Self::build_vout(&record.outputs)
        };
        let tx = json!({ "txid": txid.clone(), "vout": vout });
        inner.transactions.insert(txid.clone(), tx);

        Ok(Value::String(txid))
    }

    async fn get_transaction(&self, params: &Value) -> Result<Value> {
        const METHOD: &str = "getrawtransaction";
        let txid = params
            .get(0)
            .and_then(|p| p.as_str())
            .ok_or_else(|| Self::rpc_err(METHOD, "missing txid"))?;

        let inner = self.inner.lock().await;
        inner.transactions.get(txid).cloned().ok_or_else(|| {
            Self::rpc_err(
                METHOD,
                "No such mempool or blockchain transaction",
            )
        })
    }
}

#[async_trait]
impl LedgerRpc for MemoryLedger {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            "walletcreatefundedpsbt" => self.create_funded_psbt(&params).await,
            "finalizepsbt" => self.finalize(&params).await,
            "sendrawtransaction" => self.broadcast(&params).await,
            "getrawtransaction" => self.get_transaction(&params).await,
            other => Err(Self::rpc_err(other, "method not simulated")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{
        finalize_psbt, get_raw_transaction, send_raw_transaction, wallet_create_funded_psbt, Txid,
    };

    async fn fund_and_broadcast(ledger: &MemoryLedger, outputs: Value) -> Txid {
        let funded = wallet_create_funded_psbt(ledger, json!([]), outputs, json!({}))
            .await
            .unwrap();
        let finalized = finalize_psbt(ledger, &funded.psbt).await.unwrap();
        assert!(finalized.complete);
        send_raw_transaction(ledger, &finalized.hex.unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fund_finalize_broadcast_fetch() {
        let ledger = MemoryLedger::new();
        let txid = fund_and_broadcast(&ledger, json!({"bcrt1qdest": 0.0001})).await;

        let tx = get_raw_transaction(&ledger, &txid).await.unwrap();
        assert_eq!(tx.txid, txid);
        // Destination output plus change
        assert_eq!(tx.vout.len(), 2);
        assert!(tx.vout[0].pays_to("bcrt1qdest"));
    }

    #[tokio::test]
    async fn test_data_output_is_nulldata() {
        let ledger = MemoryLedger::new();
        let txid = fund_and_broadcast(&ledger, json!({"data": "deadbeef"})).await;

        let tx = get_raw_transaction(&ledger, &txid).await.unwrap();
        let data_out = tx.vout.iter().find(|o| o.is_null_data()).unwrap();
        assert_eq!(data_out.null_data_hex(), Some("deadbeef"));
    }

    #[tokio::test]
    async fn test_refused_finalization() {
        let ledger = MemoryLedger::new().refuse_finalization();
        let funded = wallet_create_funded_psbt(&ledger, json!([]), json!({"a": 0.1}), json!({}))
            .await
            .unwrap();
        let finalized = finalize_psbt(&ledger, &funded.psbt).await.unwrap();
        assert!(!finalized.complete);
    }

    #[tokio::test]
    async fn test_spent_input_rejected() {
        let ledger = MemoryLedger::new();
        let commit = fund_and_broadcast(&ledger, json!({"bcrt1qcommit": 0.0001})).await;

        let spend_it = || async {
            let funded = wallet_create_funded_psbt(
                &ledger,
                json!([{ "txid": commit.as_str(), "vout": 0 }]),
                json!({"data": "aa"}),
                json!({}),
            )
            .await
            .unwrap();
            let finalized = finalize_psbt(&ledger, &funded.psbt).await.unwrap();
            send_raw_transaction(&ledger, &finalized.hex.unwrap()).await
        };

        assert!(spend_it().await.is_ok());
        let err = spend_it().await.unwrap_err();
        assert!(matches!(err, LedgerError::Rpc { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn test_unknown_txid() {
        let ledger = MemoryLedger::new();
        let err = get_raw_transaction(&ledger, &Txid::new("00".repeat(32)))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rpc { .. }));
    }
}
