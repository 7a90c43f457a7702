//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use serde_json::json;

use vcseal_core::VerifiableCredential;
use vcseal_ledger::memory::MemoryLedger;
use vcseal_ledger::{Network, StaticSigner};

/// Commit address used by the fixture signer.
pub const FIXTURE_ADDRESS: &str = "bcrt1qfixturecommit000000000000000000000000";

/// The reference credential from the verification scenario.
pub fn sample_credential() -> VerifiableCredential {
    VerifiableCredential::from_value(json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "type": ["VerifiableCredential"],
        "issuer": "did:example:123",
        "credentialSubject": {"id": "did:example:456"}
    }))
    .expect("sample credential is an object")
}

/// The sample credential with one required field removed.
pub fn credential_without(field: &str) -> VerifiableCredential {
    let mut value = sample_credential().to_value();
    value
        .as_object_mut()
        .expect("sample credential is an object")
        .remove(field);
    VerifiableCredential::from_value(value).expect("still an object")
}

/// A simulated ledger plus a signer for it.
pub struct LedgerFixture {
    pub ledger: Arc<MemoryLedger>,
    pub signer: StaticSigner,
}

impl LedgerFixture {
    /// A healthy regtest-like ledger.
    pub fn new() -> Self {
        Self::with_ledger(MemoryLedger::new())
    }

    /// A fixture around a specific (possibly fault-injected) ledger.
    pub fn with_ledger(ledger: MemoryLedger) -> Self {
        Self {
            ledger: Arc::new(ledger),
            signer: StaticSigner::new(Network::Regtest, FIXTURE_ADDRESS)
                .expect("fixture address is non-empty"),
        }
    }
}

impl Default for LedgerFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_credential_is_complete() {
        assert!(sample_credential().is_complete());
    }

    #[test]
    fn test_credential_without_field() {
        let vc = credential_without("issuer");
        assert_eq!(vc.missing_fields(), vec!["issuer"]);
    }

    #[test]
    fn test_fixture_signer_address() {
        use vcseal_ledger::Signer;
        let fixture = LedgerFixture::new();
        assert_eq!(
            fixture.signer.receiving_address().unwrap().as_str(),
            FIXTURE_ADDRESS
        );
    }
}
