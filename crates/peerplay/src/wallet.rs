//! The wallet service: five resource managers over one backend and agent.
//!
//! | Manager    | Key                 | Mode   | Holds                          |
//! |------------|---------------------|--------|--------------------------------|
//! | `identity` | `peerplay-identity` | single | the local DID and its key      |
//! | `forms`    | `peerplay-forms`    | list   | form definitions               |
//! | `claims`   | `peerplay-claims`   | list   | claims this wallet requested   |
//! | `issued`   | `peerplay-issued`   | list   | credentials this wallet signed |
//! | `received` | `peerplay-vcs`      | list   | credentials from peers         |
//!
//! Operations that need an identity check for a stored one first and
//! abort before touching any state when it is missing.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{error, info, warn};
use serde_json::{Map, Value};
use url::Url;

use crate::agent::{
    CredentialAgent, CredentialDraft, ImportedIdentity, LocalAgent, ProofFormat,
};
use crate::config::PeerConfig;
use crate::error::{PeerError, Result};
use crate::exchange::{self, LinkPayload};
use crate::import::import_from;
use crate::manager::ResourceManager;
use crate::resource::{
    resolve_form, ClaimDefinition, CredentialStatus, FormDefinition, StoredIdentity,
    VerifiableCredential,
};
use crate::storage::{FileBackend, PersistenceStore, StorageBackend};

/// Credential types of every attested claim.
pub const ATTESTED_CLAIM_TYPES: [&str; 2] = ["VerifiableCredential", "AttestedClaim"];

/// Identity, forms, claims and credentials of one user.
pub struct Wallet {
    agent: Box<dyn CredentialAgent>,
    base_url: Url,
    identity: ResourceManager<StoredIdentity>,
    forms: ResourceManager<FormDefinition>,
    claims: ResourceManager<ClaimDefinition>,
    issued: ResourceManager<VerifiableCredential>,
    received: ResourceManager<VerifiableCredential>,
}

impl Wallet {
    /// Build a wallet from an explicitly constructed backend and agent.
    pub fn new(
        backend: Arc<dyn StorageBackend>,
        agent: Box<dyn CredentialAgent>,
        config: &PeerConfig,
    ) -> Self {
        let store = PersistenceStore::new(backend);
        let keys = &config.keys;
        Self {
            agent,
            base_url: config.base_url.clone(),
            identity: ResourceManager::open(store.clone(), keys.identity.as_str()),
            forms: ResourceManager::open(store.clone(), keys.forms.as_str()),
            claims: ResourceManager::open(store.clone(), keys.claims.as_str()),
            issued: ResourceManager::open(store.clone(), keys.issued.as_str()),
            received: ResourceManager::open(store, keys.received.as_str()),
        }
    }

    /// Open the file-backed wallet under `config.home` with a local agent.
    ///
    /// # Errors
    ///
    /// Returns `PeerError::Io` if the data directory cannot be created.
    pub fn open(config: &PeerConfig) -> Result<Self> {
        let backend = FileBackend::new(&config.home)?;
        info!("opened wallet at {}", config.home.display());
        Ok(Self::new(
            Arc::new(backend),
            Box::new(LocalAgent::new()),
            config,
        ))
    }

    // ── Managers ──────────────────────────────────────────────────────────────

    pub fn identity(&self) -> &ResourceManager<StoredIdentity> {
        &self.identity
    }

    pub fn identity_mut(&mut self) -> &mut ResourceManager<StoredIdentity> {
        &mut self.identity
    }

    pub fn forms(&self) -> &ResourceManager<FormDefinition> {
        &self.forms
    }

    pub fn forms_mut(&mut self) -> &mut ResourceManager<FormDefinition> {
        &mut self.forms
    }

    pub fn claims(&self) -> &ResourceManager<ClaimDefinition> {
        &self.claims
    }

    pub fn claims_mut(&mut self) -> &mut ResourceManager<ClaimDefinition> {
        &mut self.claims
    }

    pub fn issued(&self) -> &ResourceManager<VerifiableCredential> {
        &self.issued
    }

    pub fn issued_mut(&mut self) -> &mut ResourceManager<VerifiableCredential> {
        &mut self.issued
    }

    pub fn received(&self) -> &ResourceManager<VerifiableCredential> {
        &self.received
    }

    pub fn received_mut(&mut self) -> &mut ResourceManager<VerifiableCredential> {
        &mut self.received
    }

    /// Base URL of generated deep links.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Identity ──────────────────────────────────────────────────────────────

    /// Create a new identity and hold it as the imported identity.
    ///
    /// Nothing is persisted until the identity manager commits.
    pub fn generate_identity(&mut self) -> Result<&StoredIdentity> {
        let created = self.agent.create_identity()?;
        let kid = created
            .keys
            .first()
            .map(|k| k.kid.clone())
            .ok_or_else(|| PeerError::Agent(format!("identity {} has no keys", created.did)))?;
        let key = self.agent.get_key(&kid)?;
        let private = self.agent.get_private_key(&kid)?;

        let identity = StoredIdentity {
            did: created.did,
            private_key_hex: private.private_key_hex,
            public_key_hex: key.public_key_hex,
            kid: key.kid,
            key_type: key.key_type,
            extra: Map::new(),
        };
        info!("generated identity {}", identity.did);
        self.identity.import_direct(identity);
        self.identity
            .imported()
            .ok_or_else(|| PeerError::Agent("generated identity was not held".into()))
    }

    /// The committed identity.
    ///
    /// # Errors
    ///
    /// `PeerError::MissingPrerequisite` if no identity is stored.
    pub fn stored_identity(&self) -> Result<&StoredIdentity> {
        self.identity
            .stored_single()
            .ok_or_else(|| PeerError::MissingPrerequisite("you need an identity first".into()))
    }

    // ── Claims ────────────────────────────────────────────────────────────────

    /// Fill the stored form `form_id` for the local identity and hold the
    /// result as the imported claim.
    ///
    /// # Errors
    ///
    /// - `PeerError::MissingPrerequisite` if no identity is stored.
    /// - `PeerError::NotFound` if no stored form has that id.
    /// - `PeerError::InvalidForm` if a value names an unknown field.
    ///
    /// State is unchanged on any error.
    pub fn create_claim(
        &mut self,
        form_id: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<&ClaimDefinition> {
        let did = self.stored_identity()?.did.clone();
        let form = resolve_form(self.forms.stored_list(), form_id).into_result()?;
        let claim = ClaimDefinition::fill(form, &did, values)?;
        self.claims.import_direct(claim);
        self.claims
            .imported()
            .ok_or_else(|| PeerError::NotFound("claim was not held".into()))
    }

    /// Deep link for the stored claim at `index`.
    pub fn claim_link(&self, index: usize) -> Result<Url> {
        let claim = self
            .claims
            .get(index)
            .ok_or_else(|| PeerError::NotFound(format!("claim #{index}")))?;
        exchange::claim_link(&self.base_url, claim)
    }

    // ── Attestation ───────────────────────────────────────────────────────────

    /// Sign `claim` with the local identity and hold the credential as the
    /// imported issued credential.
    ///
    /// # Errors
    ///
    /// `PeerError::MissingPrerequisite` if no identity is stored, or the
    /// agent's error if it cannot load the identity or sign.
    pub fn sign_claim(&mut self, claim: &ClaimDefinition) -> Result<&VerifiableCredential> {
        let identity = self.stored_identity()?;
        let issuer = identity.did.clone();
        self.agent.import_identity(ImportedIdentity::from(identity))?;

        let mut subject = claim.credential_subject.values.clone();
        subject.insert(
            "id".into(),
            Value::String(claim.credential_subject.id.clone()),
        );
        let draft = CredentialDraft::new(issuer, subject).with_types(ATTESTED_CLAIM_TYPES);

        let vc = self.agent.issue_credential(draft, ProofFormat::Jwt)?;
        info!(
            "attested `{}` claim for {}",
            claim.form_id, claim.credential_subject.id
        );
        self.issued.import_direct(vc);
        self.issued
            .imported()
            .ok_or_else(|| PeerError::Agent("issued credential was not held".into()))
    }

    /// Parse the claim carried by an `attest` deep link.
    ///
    /// # Errors
    ///
    /// `PeerError::InvalidLink` for a malformed link or one carrying a
    /// credential; `PeerError::Import` if the claim has the wrong shape.
    pub fn claim_from_link(link: &str) -> Result<ClaimDefinition> {
        match exchange::decode_link(link)? {
            payload @ LinkPayload::Claim(_) => Ok(import_from(payload.into_source())?),
            LinkPayload::Credential(_) => Err(PeerError::InvalidLink(
                "link carries a credential, not a claim".into(),
            )),
        }
    }

    /// Deep link for the issued credential at `index`.
    pub fn issued_link(&self, index: usize) -> Result<Url> {
        let vc = self
            .issued
            .get(index)
            .ok_or_else(|| PeerError::NotFound(format!("issued credential #{index}")))?;
        exchange::credential_link(&self.base_url, vc)
    }

    // ── Verification ──────────────────────────────────────────────────────────

    /// Check `vc` with the agent. Agent failures count as invalid.
    pub fn verify(&self, vc: &VerifiableCredential) -> CredentialStatus {
        match self.agent.verify_credential(vc) {
            Ok(result) if result.verified => CredentialStatus::Valid,
            Ok(result) => {
                warn!(
                    "credential from {} failed verification: {}",
                    vc.issuer_id().unwrap_or("<unknown issuer>"),
                    result.error.as_deref().unwrap_or("no reason given")
                );
                CredentialStatus::Invalid
            }
            Err(e) => {
                error!("verification error: {e}");
                CredentialStatus::Invalid
            }
        }
    }

    /// Import the credential carried by a `verify` deep link as the
    /// imported received credential.
    pub fn receive_link(&mut self, link: &str) -> Result<&VerifiableCredential> {
        match exchange::decode_link(link)? {
            payload @ LinkPayload::Credential(_) => {
                Ok(self.received.import(payload.into_source())?)
            }
            LinkPayload::Claim(_) => Err(PeerError::InvalidLink(
                "link carries a claim, not a credential".into(),
            )),
        }
    }

    /// Verify the imported received credential and tag it with the
    /// outcome. Returns `None` if nothing is imported.
    pub fn verify_imported(&mut self) -> Option<CredentialStatus> {
        let vc = self.received.imported()?.clone();
        let status = self.verify(&vc);
        self.received.import_direct(vc.with_verified(status.is_valid()));
        Some(status)
    }

    /// Re-verify the stored received credential at `index` and persist
    /// its new tag. Returns `Ok(None)` if `index` is out of range.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the updated list cannot be written.
    pub fn verify_received(&mut self, index: usize) -> Result<Option<CredentialStatus>> {
        let Some(vc) = self.received.get(index).cloned() else {
            return Ok(None);
        };
        let status = self.verify(&vc);
        self.received
            .update_stored(index, vc.with_verified(status.is_valid()))?;
        Ok(Some(status))
    }
}
