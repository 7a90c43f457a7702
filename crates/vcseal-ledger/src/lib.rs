//! # vcseal Ledger
//!
//! The ledger capability: everything that talks to (or stands in for) the
//! node's wallet RPC interface.
//!
//! The inscription protocol only sees the [`LedgerRpc`] trait — a generic
//! call with a method name and ordered parameters. Implementations:
//!
//! - [`BitcoindRpc`] - JSON-RPC over HTTP against a real node
//! - [`memory::MemoryLedger`] - an in-process regtest simulator for tests
//!
//! Key handling is behind the [`Signer`] trait; the protocol never sees key
//! material, only receiving addresses.

pub mod error;
pub mod memory;
pub mod rpc;
pub mod signer;
pub mod wallet;

pub use error::{LedgerError, Result};
pub use rpc::{BitcoindRpc, LedgerRpc, RpcConfig};
pub use signer::{Address, Network, Signer, StaticSigner};
pub use wallet::{
    finalize_psbt, get_raw_transaction, send_raw_transaction, wallet_create_funded_psbt,
    FinalizedPsbt, FundedPsbt, RawTransaction, ScriptPubKey, TxOut, Txid,
};
