//! Scale tests: long lists, many managers over one backend, and many
//! issued credentials.

use std::sync::Arc;
use std::time::Instant;

use peerplay::storage::{FileBackend, MemoryBackend, PersistenceStore};
use peerplay::{
    ClaimDefinition, CredentialAgent, CredentialDraft, FormDefinition, ImportSource, LocalAgent,
    ProofFormat, ResourceManager, VerifiableCredential,
};
use serde_json::{json, Map, Value};

#[test]
fn scale_one_thousand_forms_file_backed() {
    let dir = tempfile::tempdir().unwrap();
    let store = PersistenceStore::new(Arc::new(FileBackend::new(dir.path()).unwrap()));
    let mut forms = ResourceManager::<FormDefinition>::open(store.clone(), "peerplay-forms");

    let start = Instant::now();
    for i in 0..1_000 {
        forms.import_direct(
            serde_json::from_value(json!({
                "id": format!("form-{i}"),
                "title": format!("Form {i}"),
                "fields": [{"name": "value", "type": "string"}]
            }))
            .unwrap(),
        );
        forms.commit().unwrap();
    }
    eprintln!("1000 commits: {:?}", start.elapsed());

    let reopened = ResourceManager::<FormDefinition>::open(store, "peerplay-forms");
    assert_eq!(reopened.len(), 1_000);
    assert_eq!(reopened.get(0).unwrap().id, "form-0");
    assert_eq!(reopened.get(999).unwrap().id, "form-999");
}

#[test]
fn scale_remove_from_front_preserves_order() {
    let store = PersistenceStore::new(Arc::new(MemoryBackend::new()));
    let mut claims = ResourceManager::<ClaimDefinition>::open(store, "peerplay-claims");
    for i in 0..500 {
        claims
            .import(ImportSource::Value(json!({
                "formId": format!("f{i}"),
                "credentialSubject": {"id": "did:key:z1"}
            })))
            .unwrap();
        claims.commit().unwrap();
    }

    for _ in 0..250 {
        claims.remove_stored(0).unwrap();
    }
    let ids: Vec<String> = claims.stored_list().iter().map(|c| c.form_id.clone()).collect();
    let expected: Vec<String> = (250..500).map(|i| format!("f{i}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn scale_managers_share_one_backend() {
    let store = PersistenceStore::new(Arc::new(MemoryBackend::new()));
    let mut managers: Vec<ResourceManager<FormDefinition>> = (0..20)
        .map(|i| ResourceManager::open(store.clone(), format!("forms-{i}")))
        .collect();

    for (i, m) in managers.iter_mut().enumerate() {
        for j in 0..=i {
            m.import_direct(
                serde_json::from_value(json!({"id": format!("{i}-{j}"), "title": "t", "fields": []}))
                    .unwrap(),
            );
            m.commit().unwrap();
        }
    }

    for i in 0..20 {
        let m = ResourceManager::<FormDefinition>::open(store.clone(), format!("forms-{i}"));
        assert_eq!(m.len(), i + 1);
    }
}

#[test]
fn scale_issue_and_verify_many_credentials() {
    let agent = LocalAgent::new();
    let issuer = agent.create_identity().unwrap().did;
    let store = PersistenceStore::new(Arc::new(MemoryBackend::new()));
    let mut vcs = ResourceManager::<VerifiableCredential>::open(store, "peerplay-vcs");

    let start = Instant::now();
    for i in 0..200 {
        let mut subject = Map::new();
        subject.insert("id".into(), Value::String(format!("did:key:zS{i}")));
        subject.insert("n".into(), json!(i));
        let draft = CredentialDraft::new(&issuer, subject).with_types(["VerifiableCredential"]);
        vcs.import_direct(agent.issue_credential(draft, ProofFormat::Jwt).unwrap());
        vcs.commit().unwrap();
    }
    eprintln!("200 issuances: {:?}", start.elapsed());

    let verifier = LocalAgent::new();
    for vc in vcs.stored_list() {
        assert!(verifier.verify_credential(vc).unwrap().verified);
    }
}
