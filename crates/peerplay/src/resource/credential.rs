//! Verifiable credentials as held by this wallet.
//!
//! Credentials are produced exclusively by the credential agent; nothing
//! here builds or edits a `proof`. The optional `verified` tag caches the
//! outcome of the last verification attempt and is never re-checked
//! automatically.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    decode, optional_str, require_array, require_map, require_object, Conformance, Resource,
    ResourceKind,
};

/// File name used when exporting any credential.
pub const CREDENTIAL_FILE_NAME: &str = "verifiable_cred.json";

/// A signed credential plus the local verification tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    pub issuer: Map<String, Value>,
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    pub credential_subject: Map<String, Value>,
    pub proof: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerifiableCredential {
    /// Issuer DID, if the issuer object carries one.
    pub fn issuer_id(&self) -> Option<&str> {
        self.issuer.get("id").and_then(Value::as_str)
    }

    /// Subject DID, if the subject carries one.
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// Proof type, e.g. `JwtProof2020`.
    pub fn proof_type(&self) -> Option<&str> {
        self.proof.get("type").and_then(Value::as_str)
    }

    /// The compact JWS carried by a JWT proof.
    pub fn jwt(&self) -> Option<&str> {
        self.proof.get("jwt").and_then(Value::as_str)
    }

    /// Return a copy with the local verification tag set.
    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    /// Return a copy without the local verification tag, as exchanged
    /// with peers.
    pub fn untagged(&self) -> Self {
        let mut vc = self.clone();
        vc.verified = None;
        vc
    }

    /// File name used when exporting this credential.
    pub fn file_name(&self) -> &'static str {
        CREDENTIAL_FILE_NAME
    }
}

impl Resource for VerifiableCredential {
    const KIND: ResourceKind = ResourceKind::VerifiableCredential;

    fn conform(candidate: &Value) -> Conformance<Self> {
        let check = || -> std::result::Result<(), String> {
            let obj = require_object(candidate, "verifiable credential")?;
            require_map(obj, "credentialSubject")?;
            require_map(obj, "issuer")?;
            require_map(obj, "proof")?;
            let types = require_array(obj, "type")?;
            if !types.iter().all(Value::is_string) {
                return Err("field `type` must be an array of strings".into());
            }
            optional_str(obj, "issuanceDate")?;
            match obj.get("verified") {
                None | Some(Value::Bool(_)) | Some(Value::Null) => Ok(()),
                Some(_) => Err("field `verified` must be a boolean".into()),
            }
        };
        match check() {
            Ok(()) => decode(candidate),
            Err(reason) => Conformance::Invalid(reason),
        }
    }
}

/// Terminal outcome of verifying one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Valid,
    Invalid,
}

impl CredentialStatus {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }

    /// Return `true` for [`CredentialStatus::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<bool> for CredentialStatus {
    fn from(verified: bool) -> Self {
        if verified {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
