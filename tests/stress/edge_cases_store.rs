//! Edge case tests: corrupt storage, partial validity, weak references,
//! import failures, and idempotent eviction.

use std::sync::Arc;

use peerplay::storage::{FileBackend, MemoryBackend, PersistenceStore, StorageBackend};
use peerplay::{
    resolve_form, ClaimDefinition, FormDefinition, FormLookup, ImportError, ImportSource,
    ResourceManager, StoreMode, Stored, StoredIdentity, VerifiableCredential,
};
use serde_json::json;

fn memory() -> (Arc<dyn StorageBackend>, PersistenceStore) {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    (backend.clone(), PersistenceStore::new(backend))
}

// === Loading ===

#[test]
fn edge_truncated_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("peerplay-forms.json"), r#"[{"id":"a","title":"A","fie"#)
        .unwrap();
    let store = PersistenceStore::new(Arc::new(FileBackend::new(dir.path()).unwrap()));
    let forms = ResourceManager::<FormDefinition>::open(store, "peerplay-forms");
    assert!(forms.is_empty());
}

#[test]
fn edge_one_invalid_among_many() {
    let (backend, store) = memory();
    let mut entries: Vec<_> = (0..10)
        .map(|i| json!({"formId": format!("f{i}"), "credentialSubject": {"id": "did:key:z1"}}))
        .collect();
    entries.insert(4, json!({"formId": "broken", "credentialSubject": {"name": "no id"}}));
    backend
        .set("peerplay-claims", &serde_json::to_string(&entries).unwrap())
        .unwrap();

    let claims = ResourceManager::<ClaimDefinition>::open(store, "peerplay-claims");
    assert_eq!(claims.len(), 10);
    assert!(claims.stored_list().iter().all(|c| c.form_id != "broken"));
}

#[test]
fn edge_invalid_entries_are_dropped_on_next_write() {
    let (backend, store) = memory();
    backend
        .set(
            "peerplay-forms",
            r#"[{"id":"a","title":"A","fields":[]}, null, {"id":"b","title":"B","fields":[]}]"#,
        )
        .unwrap();

    let mut forms = ResourceManager::<FormDefinition>::open(store, "peerplay-forms");
    forms.remove_stored(0).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&backend.get("peerplay-forms").unwrap().unwrap()).unwrap();
    assert_eq!(raw, json!([{"id": "b", "title": "B", "fields": []}]));
}

#[test]
fn edge_single_key_holding_list_loads_none() {
    let (backend, store) = memory();
    backend.set("peerplay-identity", "[]").unwrap();
    let id = ResourceManager::<StoredIdentity>::open(store, "peerplay-identity");
    assert_eq!(id.stored(), &Stored::Single(None));
}

#[test]
fn edge_extra_fields_survive_round_trip() {
    let (backend, store) = memory();
    let vc = json!({
        "@context": ["https://www.w3.org/2018/credentials/v1"],
        "issuer": {"id": "did:key:zI", "name": "Issuer"},
        "type": ["VerifiableCredential"],
        "issuanceDate": "2024-01-01T00:00:00Z",
        "credentialSubject": {"id": "did:key:zS", "nested": {"deep": [1, 2]}},
        "proof": {"type": "JwtProof2020", "jwt": "a.b.c"},
        "custom": true
    });
    let mut vcs = ResourceManager::<VerifiableCredential>::open(store.clone(), "peerplay-vcs");
    vcs.import(ImportSource::Value(vc.clone())).unwrap();
    vcs.commit().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&backend.get("peerplay-vcs").unwrap().unwrap()).unwrap();
    assert_eq!(raw, json!([vc]));
}

// === Import ===

#[test]
fn edge_import_error_kinds_are_distinct() {
    let (_, store) = memory();
    let mut forms = ResourceManager::<FormDefinition>::open(store, "peerplay-forms");
    let dir = tempfile::tempdir().unwrap();

    let missing = forms.import(ImportSource::file(dir.path().join("nope.json")));
    assert!(matches!(missing, Err(ImportError::Unreadable(_))));

    let not_json = forms.import(ImportSource::Bytes(b"title: yaml?".to_vec()));
    assert!(matches!(not_json, Err(ImportError::Parse(_))));

    let wrong_shape = forms.import(ImportSource::Value(json!({"id": "x", "title": "X"})));
    assert!(matches!(wrong_shape, Err(ImportError::InvalidFormat(_))));

    for null_like in [json!(null), json!([]), json!("form"), json!(7)] {
        assert!(forms.import(ImportSource::Value(null_like)).is_err());
    }
    assert!(forms.imported().is_none());
}

#[test]
fn edge_identity_with_wrong_field_type_rejected() {
    let (_, store) = memory();
    let mut id = ResourceManager::<StoredIdentity>::open(store, "peerplay-identity");
    let candidate = json!({
        "did": "did:key:z1",
        "privateKeyHex": "ab",
        "publicKeyHex": "cd",
        "kid": 1,
        "type": "Ed25519"
    });
    assert!(id.import(ImportSource::Value(candidate)).is_err());
}

// === Weak references ===

#[test]
fn edge_claim_form_removed_after_request() {
    let (_, store) = memory();
    let mut forms = ResourceManager::<FormDefinition>::open(store.clone(), "peerplay-forms");
    forms
        .import(ImportSource::Value(json!({"id": "a", "title": "A", "fields": []})))
        .unwrap();
    forms.commit().unwrap();

    let claim: ClaimDefinition = serde_json::from_value(json!({
        "formId": "a",
        "credentialSubject": {"id": "did:key:z1"}
    }))
    .unwrap();
    assert!(matches!(
        resolve_form(forms.stored_list(), &claim.form_id),
        FormLookup::Found(_)
    ));

    forms.clear_all().unwrap();
    assert_eq!(
        resolve_form(forms.stored_list(), &claim.form_id),
        FormLookup::NotFound("a".to_string())
    );
}

// === Eviction ===

#[test]
fn edge_clear_all_on_never_written_key() {
    let (_, store) = memory();
    let mut forms = ResourceManager::<FormDefinition>::open(store, "peerplay-forms");
    forms.clear_all().unwrap();
    forms.clear_all().unwrap();
    assert_eq!(forms.stored(), &Stored::empty(StoreMode::List));
}

#[test]
fn edge_remove_every_element_one_by_one() {
    let (_, store) = memory();
    let mut forms = ResourceManager::<FormDefinition>::open(store.clone(), "peerplay-forms");
    for id in ["a", "b", "c", "d"] {
        forms
            .import(ImportSource::Value(json!({"id": id, "title": id, "fields": []})))
            .unwrap();
        forms.commit().unwrap();
    }

    let mut expected = vec!["a", "b", "c", "d"];
    while !expected.is_empty() {
        let last = expected.len() - 1;
        forms.remove_stored(last / 2).unwrap();
        expected.remove(last / 2);
        let ids: Vec<&str> = forms.stored_list().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    let reloaded = store.load::<FormDefinition>("peerplay-forms", StoreMode::List);
    assert!(reloaded.is_empty());
}
