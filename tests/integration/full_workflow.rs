//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle across two file-backed wallets:
//! 1. Generate and commit identities
//! 2. Author a form and request a claim
//! 3. Hand the claim to a peer by deep link
//! 4. Peer attests the claim
//! 5. Hand the credential back by deep link and by file
//! 6. Verify, store, re-open, and evict

use std::collections::BTreeMap;

use peerplay::exchange::{self, export_to_file};
use peerplay::{
    CredentialStatus, FormBuilder, ImportSource, PeerConfig, StoreMode, Stored, Wallet,
};

fn config(home: &std::path::Path) -> PeerConfig {
    PeerConfig::new(home).expect("default config should build")
}

#[test]
fn full_workflow_identity_to_verification() {
    let alice_home = tempfile::tempdir().unwrap();
    let bob_home = tempfile::tempdir().unwrap();
    let files = tempfile::tempdir().unwrap();

    let mut alice = Wallet::open(&config(alice_home.path())).unwrap();
    let mut bob = Wallet::open(&config(bob_home.path())).unwrap();

    // ── Step 1: Identities ──────────────────────────────────────────────
    let alice_did = alice.generate_identity().unwrap().did.clone();
    alice.identity_mut().commit().unwrap();
    let bob_did = bob.generate_identity().unwrap().did.clone();
    bob.identity_mut().commit().unwrap();
    assert_ne!(alice_did, bob_did);

    // An identity round-trips through its export file.
    let exported = files.path().join("alice-identity.json");
    export_to_file(&exported, alice.stored_identity().unwrap()).unwrap();
    let mut scratch = Wallet::open(&config(&files.path().join("scratch"))).unwrap();
    scratch
        .identity_mut()
        .import(ImportSource::file(&exported))
        .unwrap();
    scratch.identity_mut().commit().unwrap();
    assert_eq!(scratch.stored_identity().unwrap().did, alice_did);

    // ── Step 2: Form and claim ──────────────────────────────────────────
    let form = FormBuilder::new("Course Completed")
        .description("Completion of a course")
        .field("course")
        .field("grade")
        .build()
        .unwrap();
    assert_eq!(form.id, "course-completed");
    alice.forms_mut().import_direct(form);
    alice.forms_mut().commit().unwrap();

    let values: BTreeMap<String, String> = [("course", "Rust 101"), ("grade", "A")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    alice.create_claim("course-completed", &values).unwrap();
    alice.claims_mut().commit().unwrap();
    assert_eq!(alice.claims().len(), 1);

    // ── Step 3: Claim link to Bob ───────────────────────────────────────
    let claim_link = alice.claim_link(0).unwrap();
    let claim = Wallet::claim_from_link(claim_link.as_str()).unwrap();
    assert_eq!(claim.credential_subject.id, alice_did);

    // ── Step 4: Bob attests ─────────────────────────────────────────────
    let vc = bob.sign_claim(&claim).unwrap().clone();
    bob.issued_mut().commit().unwrap();
    assert_eq!(vc.issuer_id(), Some(bob_did.as_str()));
    assert_eq!(vc.subject_id(), Some(alice_did.as_str()));
    assert_eq!(vc.credential_subject["grade"], "A");

    // ── Step 5: Credential back to Alice ────────────────────────────────
    let vc_link = bob.issued_link(0).unwrap();
    alice.receive_link(vc_link.as_str()).unwrap();
    assert_eq!(alice.verify_imported(), Some(CredentialStatus::Valid));
    alice.received_mut().commit().unwrap();

    let vc_file = files.path().join(vc.file_name());
    export_to_file(&vc_file, &vc).unwrap();
    alice
        .received_mut()
        .import(ImportSource::file(&vc_file))
        .unwrap();
    alice.received_mut().commit().unwrap();
    assert_eq!(alice.received().len(), 2);

    // ── Step 6: Verify, re-open, evict ──────────────────────────────────
    assert_eq!(alice.verify_received(1).unwrap(), Some(CredentialStatus::Valid));

    let reopened = Wallet::open(&config(alice_home.path())).unwrap();
    let received = reopened.received().stored_list();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|vc| vc.verified == Some(true)));
    assert_eq!(reopened.stored_identity().unwrap().did, alice_did);
    assert_eq!(reopened.forms().len(), 1);

    alice.received_mut().remove_stored(0).unwrap();
    assert_eq!(alice.received().len(), 1);
    alice.identity_mut().clear_all().unwrap();
    assert!(alice.stored_identity().is_err());
    assert_eq!(alice.identity().stored(), &Stored::empty(StoreMode::Single));

    // Without an identity, nothing new can be requested or signed.
    assert!(alice.create_claim("course-completed", &values).is_err());
    assert!(alice.sign_claim(&claim).is_err());
}

#[test]
fn full_workflow_tampered_credential_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let mut issuer = Wallet::open(&config(home.path())).unwrap();
    issuer.generate_identity().unwrap();
    issuer.identity_mut().commit().unwrap();

    let claim = serde_json::from_value(serde_json::json!({
        "formId": "membership",
        "credentialSubject": {"id": "did:key:zHolder", "level": "silver"}
    }))
    .unwrap();
    let vc = issuer.sign_claim(&claim).unwrap().clone();

    let mut link = exchange::credential_link(issuer.base_url(), &vc).unwrap();
    let forged = {
        let mut forged = vc.clone();
        forged
            .credential_subject
            .insert("level".into(), serde_json::json!("gold"));
        forged
    };
    link.query_pairs_mut()
        .clear()
        .append_pair("vc", &serde_json::to_string(&forged).unwrap());

    let holder_home = tempfile::tempdir().unwrap();
    let mut holder = Wallet::open(&config(holder_home.path())).unwrap();
    holder.receive_link(link.as_str()).unwrap();
    assert_eq!(holder.verify_imported(), Some(CredentialStatus::Invalid));
    assert_eq!(holder.received().imported().unwrap().verified, Some(false));
}
