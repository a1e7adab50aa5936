//! `did:key` identifiers for Ed25519 keys.
//!
//! Format: `did:key:z` + base58btc(`0xed 0x01` ‖ public key). The `z`
//! prefix is the multibase tag for base58btc and `0xed01` is the varint
//! multicodec for an Ed25519 public key.

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::crypto::keys::Ed25519KeyPair;
use crate::error::{PeerError, Result};

const DID_KEY_PREFIX: &str = "did:key:";
const MULTIBASE_BASE58BTC: char = 'z';
const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Verification method type advertised in resolved documents.
pub const VERIFICATION_METHOD_TYPE: &str = "Ed25519VerificationKey2018";

/// Build the `did:key` identifier for a verifying key.
pub fn did_from_verifying_key(key: &VerifyingKey) -> String {
    let mut buf = Vec::with_capacity(34);
    buf.extend_from_slice(&ED25519_MULTICODEC);
    buf.extend_from_slice(key.as_bytes());
    format!(
        "{DID_KEY_PREFIX}{MULTIBASE_BASE58BTC}{}",
        bs58::encode(buf).into_string()
    )
}

/// Extract the Ed25519 verifying key embedded in a `did:key` identifier.
///
/// Any DID URL fragment (`#...`) is ignored.
pub fn verifying_key_from_did(did: &str) -> Result<VerifyingKey> {
    let did = did.split('#').next().unwrap_or(did);

    let multibase = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| PeerError::InvalidDid(format!("unsupported DID method: {did}")))?;

    let encoded = multibase.strip_prefix(MULTIBASE_BASE58BTC).ok_or_else(|| {
        PeerError::InvalidDid(format!("did:key must use base58btc multibase: {did}"))
    })?;

    let raw = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| PeerError::InvalidDid(format!("invalid base58 in {did}: {e}")))?;

    let key = raw
        .strip_prefix(&ED25519_MULTICODEC[..])
        .ok_or_else(|| PeerError::InvalidDid(format!("not an Ed25519 did:key: {did}")))?;

    let bytes: [u8; 32] = key
        .try_into()
        .map_err(|_| PeerError::InvalidDid(format!("Ed25519 key must be 32 bytes: {did}")))?;

    Ed25519KeyPair::verifying_key_from_bytes(&bytes)
}

/// Minimal DID document for a resolved `did:key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    pub id: String,
    pub verification_method: Vec<VerificationMethod>,
    pub assertion_method: Vec<String>,
    pub authentication: Vec<String>,
}

/// A single verification method of a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub method_type: String,
    pub controller: String,
    pub public_key_hex: String,
}

/// Resolve a `did:key` into its DID document without any network access.
pub fn resolve(did: &str) -> Result<DidDocument> {
    let did = did.split('#').next().unwrap_or(did);
    let key = verifying_key_from_did(did)?;
    let fragment = did.strip_prefix(DID_KEY_PREFIX).unwrap_or(did);
    let method_id = format!("{did}#{fragment}");

    Ok(DidDocument {
        id: did.to_string(),
        verification_method: vec![VerificationMethod {
            id: method_id.clone(),
            method_type: VERIFICATION_METHOD_TYPE.to_string(),
            controller: did.to_string(),
            public_key_hex: hex::encode(key.as_bytes()),
        }],
        assertion_method: vec![method_id.clone()],
        authentication: vec![method_id],
    })
}
