//! In-process agent over Ed25519 `did:key` identities.
//!
//! Keys live in memory only, indexed by kid (the public key hex). The
//! wallet re-imports the stored identity before each issuance, so a fresh
//! agent per process is enough.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::debug;
use serde_json::{json, Map, Value};

use super::jwt;
use super::{
    CreatedIdentity, CredentialAgent, CredentialDraft, ImportedIdentity, KeyInfo, KeyRef,
    PrivateKeyInfo, ProofFormat, VerificationResult, CREDENTIALS_V1_CONTEXT, JWT_PROOF_TYPE,
};
use crate::crypto::keys::{Ed25519KeyPair, ED25519_KEY_TYPE};
use crate::did::{self, DidDocument};
use crate::error::{PeerError, Result};
use crate::resource::VerifiableCredential;
use crate::time;

#[derive(Default)]
struct Keyring {
    /// kid → key pair.
    keys: HashMap<String, Ed25519KeyPair>,
    /// DID → kid of its signing key.
    dids: HashMap<String, String>,
}

/// A [`CredentialAgent`] holding its keys in process memory.
#[derive(Default)]
pub struct LocalAgent {
    keyring: Mutex<Keyring>,
}

impl LocalAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn keyring(&self) -> Result<MutexGuard<'_, Keyring>> {
        self.keyring
            .lock()
            .map_err(|_| PeerError::Agent("keyring lock poisoned".into()))
    }

    fn insert(&self, did: String, kp: Ed25519KeyPair) -> Result<String> {
        let kid = kp.public_key_hex();
        let mut ring = self.keyring()?;
        ring.keys.insert(kid.clone(), kp);
        ring.dids.insert(did, kid.clone());
        Ok(kid)
    }
}

impl CredentialAgent for LocalAgent {
    fn create_identity(&self) -> Result<CreatedIdentity> {
        let kp = Ed25519KeyPair::generate();
        let did = did::did_from_verifying_key(kp.verifying_key());
        let kid = self.insert(did.clone(), kp)?;
        debug!("created identity {did}");
        Ok(CreatedIdentity {
            did,
            keys: vec![KeyRef { kid }],
        })
    }

    fn get_key(&self, kid: &str) -> Result<KeyInfo> {
        let ring = self.keyring()?;
        let kp = ring
            .keys
            .get(kid)
            .ok_or_else(|| PeerError::NotFound(format!("key {kid}")))?;
        Ok(KeyInfo {
            kid: kid.to_string(),
            public_key_hex: kp.public_key_hex(),
            key_type: ED25519_KEY_TYPE.to_string(),
        })
    }

    fn get_private_key(&self, alias: &str) -> Result<PrivateKeyInfo> {
        let ring = self.keyring()?;
        let kp = ring
            .keys
            .get(alias)
            .ok_or_else(|| PeerError::NotFound(format!("key {alias}")))?;
        Ok(PrivateKeyInfo {
            alias: alias.to_string(),
            private_key_hex: kp.private_key_hex(),
        })
    }

    fn import_identity(&self, identity: ImportedIdentity) -> Result<()> {
        let Some(first) = identity.keys.first() else {
            return Err(PeerError::InvalidKey(format!(
                "identity {} has no keys",
                identity.did
            )));
        };
        if first.key_type != ED25519_KEY_TYPE {
            return Err(PeerError::InvalidKey(format!(
                "unsupported key type `{}`",
                first.key_type
            )));
        }

        let kp = Ed25519KeyPair::from_private_key_hex(&first.private_key_hex)?;
        if !kp.public_key_hex().eq_ignore_ascii_case(first.public_key_hex.trim()) {
            return Err(PeerError::InvalidKey(
                "public key does not match private key".into(),
            ));
        }
        let expected = did::did_from_verifying_key(kp.verifying_key());
        if expected != identity.did {
            return Err(PeerError::InvalidDid(format!(
                "{} is not controlled by the supplied key",
                identity.did
            )));
        }

        self.insert(identity.did, kp)?;
        Ok(())
    }

    fn issue_credential(
        &self,
        draft: CredentialDraft,
        format: ProofFormat,
    ) -> Result<VerifiableCredential> {
        let ProofFormat::Jwt = format;

        // An unparseable requested date is replaced so the outer date
        // always agrees with the signed `nbf`.
        let (nbf, issuance_date) = match draft.issuance_date.as_deref() {
            Some(date) => match time::rfc3339_to_secs(date) {
                Some(secs) => (secs, date.to_string()),
                None => {
                    let now = time::now_secs();
                    (now, time::secs_to_rfc3339(now))
                }
            },
            None => {
                let now = time::now_secs();
                (now, time::secs_to_rfc3339(now))
            }
        };

        let context: Vec<Value> = std::iter::once(CREDENTIALS_V1_CONTEXT.to_string())
            .chain(draft.context.iter().cloned())
            .map(Value::String)
            .collect();

        let mut claims = draft.credential_subject.clone();
        let subject = claims.remove("id");

        let mut payload = json!({
            "vc": {
                "@context": context,
                "type": draft.credential_type,
                "credentialSubject": claims,
            },
            "nbf": nbf,
            "iss": draft.issuer,
        });
        if let (Some(sub), Some(obj)) = (subject, payload.as_object_mut()) {
            obj.insert("sub".into(), sub);
        }

        let token = {
            let ring = self.keyring()?;
            let kp = ring
                .dids
                .get(&draft.issuer)
                .and_then(|kid| ring.keys.get(kid))
                .ok_or_else(|| PeerError::NotFound(format!("no key for issuer {}", draft.issuer)))?;
            jwt::encode(&payload, kp.signing_key())?
        };

        let mut issuer = Map::new();
        issuer.insert("id".into(), Value::String(draft.issuer.clone()));
        let mut proof = Map::new();
        proof.insert("type".into(), Value::String(JWT_PROOF_TYPE.into()));
        proof.insert("jwt".into(), Value::String(token));
        let mut extra = Map::new();
        extra.insert("@context".into(), Value::Array(context));

        debug!("issued {:?} credential from {}", draft.credential_type, draft.issuer);
        Ok(VerifiableCredential {
            issuer,
            credential_type: draft.credential_type,
            issuance_date: Some(issuance_date),
            credential_subject: draft.credential_subject,
            proof,
            verified: None,
            extra,
        })
    }

    fn verify_credential(&self, credential: &VerifiableCredential) -> Result<VerificationResult> {
        match credential.proof_type() {
            Some(JWT_PROOF_TYPE) => {}
            Some(other) => {
                return Err(PeerError::Agent(format!("unsupported proof type `{other}`")))
            }
            None => return Err(PeerError::Agent("credential proof has no type".into())),
        }
        let Some(token) = credential.jwt() else {
            return Err(PeerError::Agent("JWT proof carries no token".into()));
        };

        let decoded = match jwt::decode(token) {
            Ok(d) => d,
            Err(e) => return Ok(VerificationResult::invalid(e.to_string())),
        };
        Ok(check_jwt_credential(&decoded, credential))
    }

    fn resolve_did(&self, did: &str) -> Result<DidDocument> {
        did::resolve(did)
    }
}

/// Check the signature and that the signed payload matches the credential.
fn check_jwt_credential(
    decoded: &jwt::DecodedJwt,
    credential: &VerifiableCredential,
) -> VerificationResult {
    if decoded.alg() != Some(jwt::ALG_EDDSA) {
        return VerificationResult::invalid(format!("unsupported JWT alg {:?}", decoded.alg()));
    }

    let Some(iss) = decoded.claim_str("iss") else {
        return VerificationResult::invalid("JWT has no `iss` claim");
    };
    let key = match did::verifying_key_from_did(iss) {
        Ok(k) => k,
        Err(e) => return VerificationResult::invalid(e.to_string()),
    };
    if let Err(e) = decoded.verify(&key) {
        return VerificationResult::invalid(e.to_string());
    }

    if credential.issuer_id() != Some(iss) {
        return VerificationResult::invalid("issuer does not match signed `iss`");
    }
    if credential.subject_id() != decoded.claim_str("sub") {
        return VerificationResult::invalid("subject does not match signed `sub`");
    }

    let vc = decoded.payload.get("vc");
    let signed_types = vc.and_then(|vc| vc.get("type"));
    let outer_types: Vec<Value> = credential
        .credential_type
        .iter()
        .cloned()
        .map(Value::String)
        .collect();
    if signed_types != Some(&Value::Array(outer_types)) {
        return VerificationResult::invalid("types do not match signed payload");
    }

    let signed_subject = vc
        .and_then(|vc| vc.get("credentialSubject"))
        .and_then(Value::as_object);
    let mut outer_subject = credential.credential_subject.clone();
    outer_subject.remove("id");
    if signed_subject != Some(&outer_subject) {
        return VerificationResult::invalid("credential subject does not match signed payload");
    }

    if let Some(date) = credential.issuance_date.as_deref() {
        let signed_nbf = decoded.payload.get("nbf").and_then(Value::as_i64);
        if signed_nbf.is_none() || time::rfc3339_to_secs(date) != signed_nbf {
            return VerificationResult::invalid("issuanceDate does not match signed `nbf`");
        }
    }

    VerificationResult::valid()
}
