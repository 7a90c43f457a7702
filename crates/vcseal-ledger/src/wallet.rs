//! Typed wrappers over the wallet RPC methods the protocol needs.
//!
//! Four calls cover the whole lifecycle: construct-and-fund a transaction,
//! finalize it, broadcast it, and fetch a transaction in verbose form.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::error::{LedgerError, Result};
use crate::rpc::LedgerRpc;

/// A transaction id, as the 64-hex string the node reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Txid(String);

impl Txid {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of `walletcreatefundedpsbt`.
#[derive(Debug, Clone, Deserialize)]
pub struct FundedPsbt {
    /// The partially signed transaction, base64.
    pub psbt: String,
    /// Fee the wallet selected, in whole coins.
    #[serde(default)]
    pub fee: f64,
    /// Position of the change output, -1 if none.
    #[serde(default)]
    pub changepos: i64,
}

/// Result of `finalizepsbt`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalizedPsbt {
    /// Whether the transaction is fully signed and ready to broadcast.
    pub complete: bool,
    /// The raw transaction hex, present when complete.
    #[serde(default)]
    pub hex: Option<String>,
}

/// A script with the node's classification of it.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
    #[serde(rename = "type", default)]
    pub script_type: String,
    #[serde(default)]
    pub address: Option<String>,
}

/// One output of a verbose transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TxOut {
    /// Output value in whole coins.
    #[serde(default)]
    pub value: f64,
    /// Output index.
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

impl TxOut {
    /// Whether this is a null-data (OP_RETURN) output.
    pub fn is_null_data(&self) -> bool {
        self.script_pub_key.script_type == "nulldata"
            || self.script_pub_key.asm.starts_with("OP_RETURN")
    }

    /// The embedded hex of a null-data output, if any.
    ///
    /// Verbose form renders these scripts as `OP_RETURN <hex>`.
    pub fn null_data_hex(&self) -> Option<&str> {
        if !self.is_null_data() {
            return None;
        }
        self.script_pub_key.asm.split_whitespace().nth(1)
    }

    /// Whether this output pays the given address.
    pub fn pays_to(&self, address: &str) -> bool {
        self.script_pub_key.address.as_deref() == Some(address)
    }
}

/// A transaction in verbose form, trimmed to the fields the protocol reads.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub txid: Txid,
    #[serde(default)]
    pub vout: Vec<TxOut>,
}

fn parse<T: serde::de::DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| LedgerError::MalformedResponse {
        method: method.to_string(),
        reason: e.to_string(),
    })
}

/// `walletcreatefundedpsbt`: have the wallet construct and fund a
/// transaction with the given inputs, outputs, and options.
pub async fn wallet_create_funded_psbt<L: LedgerRpc + ?Sized>(
    ledger: &L,
    inputs: Value,
    outputs: Value,
    options: Value,
) -> Result<FundedPsbt> {
    const METHOD: &str = "walletcreatefundedpsbt";
    let result = ledger
        .call(METHOD, json!([inputs, outputs, 0, options, true]))
        .await?;
    parse(METHOD, result)
}

/// `finalizepsbt`: sign and extract the raw transaction.
pub async fn finalize_psbt<L: LedgerRpc + ?Sized>(ledger: &L, psbt: &str) -> Result<FinalizedPsbt> {
    const METHOD: &str = "finalizepsbt";
    let result = ledger.call(METHOD, json!([psbt])).await?;
    parse(METHOD, result)
}

/// `sendrawtransaction`: broadcast a raw transaction, returning its txid.
pub async fn send_raw_transaction<L: LedgerRpc + ?Sized>(ledger: &L, hex: &str) -> Result<Txid> {
    const METHOD: &str = "sendrawtransaction";
    let result = ledger.call(METHOD, json!([hex])).await?;
    parse(METHOD, result)
}

/// `getrawtransaction` in verbose form.
pub async fn get_raw_transaction<L: LedgerRpc + ?Sized>(
    ledger: &L,
    txid: &Txid,
) -> Result<RawTransaction> {
    const METHOD: &str = "getrawtransaction";
    let result = ledger.call(METHOD, json!([txid.as_str(), true])).await?;
    parse(METHOD, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn null_data_out(asm: &str) -> TxOut {
        TxOut {
            value: 0.0,
            n: 0,
            script_pub_key: ScriptPubKey {
                asm: asm.to_string(),
                hex: String::new(),
                script_type: "nulldata".to_string(),
                address: None,
            },
        }
    }

    #[test]
    fn test_null_data_detection() {
        let out = null_data_out("OP_RETURN deadbeef");
        assert!(out.is_null_data());
        assert_eq!(out.null_data_hex(), Some("deadbeef"));
    }

    #[test]
    fn test_null_data_without_payload() {
        let out = null_data_out("OP_RETURN");
        assert!(out.is_null_data());
        assert_eq!(out.null_data_hex(), None);
    }

    #[test]
    fn test_payment_output_is_not_null_data() {
        let out = TxOut {
            value: 0.0001,
            n: 0,
            script_pub_key: ScriptPubKey {
                asm: "0 abc".to_string(),
                hex: String::new(),
                script_type: "witness_v0_keyhash".to_string(),
                address: Some("bcrt1qexample".to_string()),
            },
        };
        assert!(!out.is_null_data());
        assert!(out.pays_to("bcrt1qexample"));
        assert!(!out.pays_to("bcrt1qother"));
    }

    #[test]
    fn test_verbose_tx_deserializes() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "txid": "ab".repeat(32),
            "version": 2,
            "vout": [
                {"value": 0.0001, "n": 0, "scriptPubKey": {
                    "asm": "0 abc", "hex": "0014", "type": "witness_v0_keyhash",
                    "address": "bcrt1qexample"
                }},
                {"value": 0.0, "n": 1, "scriptPubKey": {
                    "asm": "OP_RETURN cafe", "hex": "6a02cafe", "type": "nulldata"
                }}
            ]
        }))
        .unwrap();

        assert_eq!(raw.vout.len(), 2);
        assert!(raw.vout[1].is_null_data());
        assert_eq!(raw.vout[1].null_data_hex(), Some("cafe"));
    }
}
