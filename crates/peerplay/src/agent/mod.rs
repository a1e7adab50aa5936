//! DID/VC agent — key management, credential issuance and verification.
//!
//! The wallet never touches signatures itself. Every cryptographic step
//! goes through a [`CredentialAgent`], which is constructed explicitly and
//! handed to the wallet at startup. [`LocalAgent`] is the in-process
//! implementation over Ed25519 `did:key` identities and JWT proofs.

pub mod jwt;
pub mod local;

use serde_json::{Map, Value};

use crate::did::DidDocument;
use crate::error::Result;
use crate::resource::{StoredIdentity, VerifiableCredential};

pub use local::LocalAgent;

/// Base JSON-LD context of every issued credential.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Proof type attached to JWT-secured credentials.
pub const JWT_PROOF_TYPE: &str = "JwtProof2020";

/// A freshly created identity: its DID and the ids of its keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIdentity {
    pub did: String,
    pub keys: Vec<KeyRef>,
}

/// Reference to a managed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRef {
    pub kid: String,
}

/// Public information about a managed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub kid: String,
    pub public_key_hex: String,
    pub key_type: String,
}

/// Private key material for a managed key.
#[derive(Clone)]
pub struct PrivateKeyInfo {
    pub alias: String,
    pub private_key_hex: String,
}

impl std::fmt::Debug for PrivateKeyInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyInfo")
            .field("alias", &self.alias)
            .field("private_key_hex", &"<redacted>")
            .finish()
    }
}

/// An externally held identity to load into the agent.
#[derive(Debug, Clone)]
pub struct ImportedIdentity {
    pub did: String,
    pub keys: Vec<ImportedKey>,
}

/// One key of an [`ImportedIdentity`].
#[derive(Clone)]
pub struct ImportedKey {
    pub kid: String,
    pub key_type: String,
    pub public_key_hex: String,
    pub private_key_hex: String,
}

impl std::fmt::Debug for ImportedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportedKey")
            .field("kid", &self.kid)
            .field("key_type", &self.key_type)
            .field("public_key_hex", &self.public_key_hex)
            .finish_non_exhaustive()
    }
}

impl From<&StoredIdentity> for ImportedIdentity {
    fn from(identity: &StoredIdentity) -> Self {
        Self {
            did: identity.did.clone(),
            keys: vec![ImportedKey {
                kid: identity.kid.clone(),
                key_type: identity.key_type.clone(),
                public_key_hex: identity.public_key_hex.clone(),
                private_key_hex: identity.private_key_hex.clone(),
            }],
        }
    }
}

/// An unsigned credential handed to the agent for issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialDraft {
    /// Issuer DID. The agent must hold its key.
    pub issuer: String,
    pub credential_type: Vec<String>,
    /// Defaults to the issuance time when absent.
    pub issuance_date: Option<String>,
    pub credential_subject: Map<String, Value>,
    /// Extra JSON-LD contexts after [`CREDENTIALS_V1_CONTEXT`].
    pub context: Vec<String>,
}

impl CredentialDraft {
    /// Start a draft with the base `VerifiableCredential` type.
    pub fn new(issuer: impl Into<String>, credential_subject: Map<String, Value>) -> Self {
        Self {
            issuer: issuer.into(),
            credential_type: vec!["VerifiableCredential".to_string()],
            issuance_date: None,
            credential_subject,
            context: Vec::new(),
        }
    }

    /// Replace the credential types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credential_type = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Proof formats an agent can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofFormat {
    /// Compact JWS signed with EdDSA.
    Jwt,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub verified: bool,
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn valid() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            error: Some(reason.into()),
        }
    }
}

/// The narrow interface the wallet consumes for all cryptography.
pub trait CredentialAgent: Send + Sync {
    /// Create a new identity and keep its key.
    fn create_identity(&self) -> Result<CreatedIdentity>;

    /// Public information about a held key.
    fn get_key(&self, kid: &str) -> Result<KeyInfo>;

    /// Private key material of a held key.
    fn get_private_key(&self, alias: &str) -> Result<PrivateKeyInfo>;

    /// Load an external identity so it can issue credentials.
    fn import_identity(&self, identity: ImportedIdentity) -> Result<()>;

    /// Sign `draft` with the issuer's key.
    fn issue_credential(
        &self,
        draft: CredentialDraft,
        format: ProofFormat,
    ) -> Result<VerifiableCredential>;

    /// Check a credential's proof and its consistency with the payload.
    ///
    /// A credential that fails the check yields `verified: false`; an
    /// error means the agent could not judge it at all.
    fn verify_credential(&self, credential: &VerifiableCredential) -> Result<VerificationResult>;

    /// Resolve a DID into its document.
    fn resolve_did(&self, did: &str) -> Result<DidDocument>;
}
