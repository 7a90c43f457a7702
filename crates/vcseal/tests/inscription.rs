//! End-to-end inscription scenarios against the simulated ledger.

use std::sync::Arc;

use vcseal::core::CodecError;
use vcseal::ledger::memory::MemoryLedger;
use vcseal::{
    EnvelopeCodec, Inscriber, InscriberConfig, InscriptionId, InscriptionProtocol, ProtocolError,
    RetrievalVerifier, SCHEMA_VERSION,
};
use vcseal::ledger::{Network, StaticSigner};
use vcseal_testkit::fixtures::{credential_without, sample_credential, LedgerFixture, FIXTURE_ADDRESS};

fn inscriber(fixture: &LedgerFixture) -> Inscriber<MemoryLedger, vcseal::ledger::StaticSigner> {
    Inscriber::new(
        Arc::clone(&fixture.ledger),
        fixture.signer.clone(),
        InscriberConfig::default(),
    )
}

fn protocol(
    fixture: &LedgerFixture,
) -> InscriptionProtocol<MemoryLedger, vcseal::ledger::StaticSigner> {
    InscriptionProtocol::new(Arc::clone(&fixture.ledger), fixture.signer.clone())
}

#[tokio::test]
async fn test_inscribe_then_verify() {
    let fixture = LedgerFixture::new();
    let inscriber = inscriber(&fixture);
    let vc = sample_credential();

    let record = inscriber.inscribe(&vc).await.unwrap();
    assert_eq!(record.hash_hex.len(), 64);

    let result = inscriber.verify(&record.inscription_id).await.unwrap();
    assert_eq!(result.version, SCHEMA_VERSION);
    assert_eq!(result.alg, "sha256");
    assert_eq!(result.hash_hex, record.hash_hex);
    assert_eq!(result.vc, vc);
}

#[tokio::test]
async fn test_commit_then_reveal_returns_inscription_id() {
    let fixture = LedgerFixture::new();
    let protocol = protocol(&fixture);
    let payload = EnvelopeCodec::default().encode(&sample_credential()).unwrap();

    let commit = protocol.commit(10_000).await.unwrap();
    assert_eq!(commit.amount_sats, 10_000);

    let inscription_id = protocol.reveal(commit, &payload.to_hex()).await.unwrap();
    assert!(!inscription_id.to_string().is_empty());
}

#[tokio::test]
async fn test_reveal_fails_when_commit_tx_has_no_outputs() {
    let fixture = LedgerFixture::with_ledger(MemoryLedger::new().drop_outputs());
    let protocol = protocol(&fixture);
    let payload = EnvelopeCodec::default().encode(&sample_credential()).unwrap();

    let commit = protocol.commit(10_000).await.unwrap();
    let err = protocol.reveal(commit, &payload.to_hex()).await.unwrap_err();
    assert!(matches!(err, ProtocolError::NoOutputsInCommitTx { .. }), "{err:?}");
}

#[tokio::test]
async fn test_commit_rejects_address_on_wrong_network() {
    // A regtest address under a signer claiming mainnet never gets funded.
    let ledger = Arc::new(MemoryLedger::new());
    let signer = StaticSigner::new(Network::Mainnet, FIXTURE_ADDRESS).unwrap();
    let protocol = InscriptionProtocol::new(ledger, signer);

    let err = protocol.commit(10_000).await.unwrap_err();
    assert!(
        matches!(err, ProtocolError::AddressNetworkMismatch { .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_commit_fails_when_finalization_refused() {
    let fixture = LedgerFixture::with_ledger(MemoryLedger::new().refuse_finalization());
    let protocol = protocol(&fixture);

    let err = protocol.commit(10_000).await.unwrap_err();
    assert!(matches!(err, ProtocolError::CommitFinalizationFailed), "{err:?}");
}

#[tokio::test]
async fn test_incomplete_credential_fails_verification() {
    // The codec happily encodes an incomplete credential; the gate is at
    // verification time, and each required field triggers it.
    let fixture = LedgerFixture::new();
    let protocol = protocol(&fixture);
    let verifier = RetrievalVerifier::new(Arc::clone(&fixture.ledger), EnvelopeCodec::default());

    for field in ["@context", "type", "issuer", "credentialSubject"] {
        let payload = EnvelopeCodec::default()
            .encode(&credential_without(field))
            .unwrap();

        let commit = protocol.commit(10_000).await.unwrap();
        let id = protocol.reveal(commit, &payload.to_hex()).await.unwrap();

        match verifier.verify(&id).await {
            Err(ProtocolError::IncompleteCredential { missing }) => {
                assert_eq!(missing, vec![field.to_string()]);
            }
            other => panic!("expected IncompleteCredential for {field}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_verify_fails_without_data_output() {
    // A plain funding transaction carries no null-data output.
    let fixture = LedgerFixture::new();
    let protocol = protocol(&fixture);

    let commit = protocol.commit(10_000).await.unwrap();
    let not_an_inscription = InscriptionId::new(commit.txid.clone());

    let verifier = RetrievalVerifier::new(Arc::clone(&fixture.ledger), EnvelopeCodec::default());
    let err = verifier.verify(&not_an_inscription).await.unwrap_err();
    assert!(matches!(err, ProtocolError::NoDataOutput { .. }), "{err:?}");
}

#[tokio::test]
async fn test_tampered_payload_detected_at_verification() {
    let fixture = LedgerFixture::new();
    let protocol = protocol(&fixture);
    let payload = EnvelopeCodec::default().encode(&sample_credential()).unwrap();

    // Flip one bit inside the credential bytes before publishing
    let mut raw = payload.envelope_bytes().to_vec();
    let pos = raw
        .windows(payload.canonical_vc().len())
        .position(|w| w == payload.canonical_vc())
        .unwrap();
    raw[pos] ^= 0x01;

    let commit = protocol.commit(10_000).await.unwrap();
    let id = protocol.reveal(commit, &hex::encode(raw)).await.unwrap();

    let verifier = RetrievalVerifier::new(Arc::clone(&fixture.ledger), EnvelopeCodec::default());
    let err = verifier.verify(&id).await.unwrap_err();
    assert!(
        matches!(err, ProtocolError::Codec(CodecError::IntegrityMismatch { .. })),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_unknown_inscription_id_surfaces_ledger_error() {
    let fixture = LedgerFixture::new();
    let verifier = RetrievalVerifier::new(Arc::clone(&fixture.ledger), EnvelopeCodec::default());

    let err = verifier
        .verify(&InscriptionId::from_str_id("00".repeat(32)))
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Ledger(_)), "{err:?}");
}
