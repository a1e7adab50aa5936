//! The locally held identity: a `did:key` DID plus its key pair in hex.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode, require_object, require_str, Conformance, Resource, ResourceKind, StoreMode};
use crate::crypto::keys::Ed25519KeyPair;
use crate::error::Result;

/// File name used when exporting the identity.
pub const IDENTITY_FILE_NAME: &str = "peerplay-identity.json";

/// An identity as stored on this device and exported to file.
///
/// The private key never leaves the device except through an explicit
/// user-initiated export.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    pub did: String,
    pub private_key_hex: String,
    pub public_key_hex: String,
    pub kid: String,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredIdentity {
    /// Rebuild the signing key pair from the stored private key.
    pub fn key_pair(&self) -> Result<Ed25519KeyPair> {
        Ed25519KeyPair::from_private_key_hex(&self.private_key_hex)
    }

    /// File name used when exporting this identity.
    pub fn file_name(&self) -> &'static str {
        IDENTITY_FILE_NAME
    }
}

impl std::fmt::Debug for StoredIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredIdentity")
            .field("did", &self.did)
            .field("private_key_hex", &"<redacted>")
            .field("public_key_hex", &self.public_key_hex)
            .field("kid", &self.kid)
            .field("key_type", &self.key_type)
            .finish()
    }
}

impl Resource for StoredIdentity {
    const KIND: ResourceKind = ResourceKind::Identity;
    const MODE: StoreMode = StoreMode::Single;

    fn conform(candidate: &Value) -> Conformance<Self> {
        let check = || -> std::result::Result<(), String> {
            let obj = require_object(candidate, "identity")?;
            for field in ["did", "privateKeyHex", "publicKeyHex", "kid", "type"] {
                require_str(obj, field)?;
            }
            Ok(())
        };
        match check() {
            Ok(()) => decode(candidate),
            Err(reason) => Conformance::Invalid(reason),
        }
    }
}
