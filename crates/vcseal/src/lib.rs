//! # vcseal
//!
//! Publish Verifiable Credentials into a ledger's null-data outputs and
//! verify them later.
//!
//! ## Overview
//!
//! A credential is canonicalized to deterministic CBOR, wrapped in a
//! hash-integrity envelope, and embedded on-chain with a two-phase protocol:
//!
//! - **Commit**: a funding transaction locks sats at a fresh address
//! - **Reveal**: a second transaction spends that output and carries the
//!   envelope in an OP_RETURN output
//! - **Verify**: fetch the reveal transaction, decode the envelope, recheck
//!   the hash and the credential's required fields
//!
//! Commit and reveal are not atomic: a failed reveal leaves the committed
//! funds at the commit address for manual recovery.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vcseal::{Inscriber, InscriberConfig, VerifiableCredential};
//! use vcseal::ledger::{BitcoindRpc, Network, RpcConfig, StaticSigner};
//!
//! async fn example() {
//!     let rpc = RpcConfig::new("http://127.0.0.1:18443", "user", "pass");
//!     let ledger = Arc::new(BitcoindRpc::new(rpc).unwrap());
//!     let signer = StaticSigner::new(Network::Regtest, "bcrt1q...").unwrap();
//!
//!     let inscriber = Inscriber::new(ledger, signer, InscriberConfig::default());
//!
//!     let vc = VerifiableCredential::from_json_str(r#"{
//!         "@context": ["https://www.w3.org/2018/credentials/v1"],
//!         "type": ["VerifiableCredential"],
//!         "issuer": "did:example:123",
//!         "credentialSubject": {"id": "did:example:456"}
//!     }"#).unwrap();
//!
//!     let record = inscriber.inscribe(&vc).await.unwrap();
//!     let result = inscriber.verify(&record.inscription_id).await.unwrap();
//!     assert_eq!(result.vc, vc);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `vcseal::core` - codec primitives (envelope, canonical CBOR)
//! - `vcseal::ledger` - the ledger capability (RPC client, signer seam)

pub mod config;
pub mod error;
pub mod inscriber;
pub mod protocol;
pub mod verify;

// Re-export component crates
pub use vcseal_core as core;
pub use vcseal_ledger as ledger;

// Re-export main types for convenience
pub use config::{InscriberConfig, DEFAULT_COMMIT_AMOUNT_SATS};
pub use error::{ProtocolError, Result};
pub use inscriber::{Inscriber, InscriptionRecord};
pub use protocol::{CommitReference, InscriptionId, InscriptionProtocol};
pub use verify::{RetrievalVerifier, VerificationResult};

// Re-export commonly used core types
pub use vcseal_core::{
    CodecError, DecodedEnvelope, EnvelopeCodec, Payload, VerifiableCredential, SCHEMA_VERSION,
};
