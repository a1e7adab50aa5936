//! Ed25519 key pair generation and hex import/export.
//!
//! Ed25519 is the only key type used by `did:key` identities here.
//! Key material crosses the wallet boundary as lowercase hex.

use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::{PeerError, Result};

/// Key type label carried by stored identities.
pub const ED25519_KEY_TYPE: &str = "Ed25519";

/// An Ed25519 key pair for signing operations.
///
/// `SigningKey` zeroizes its secret on drop (ed25519-dalek's `zeroize`
/// feature); temporary copies made here are wiped explicitly.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from a hex private key.
    ///
    /// Accepts either the 32-byte seed or the 64-byte `seed ‖ public` form
    /// that some wallets export; in the latter case only the seed is used.
    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self> {
        let mut raw = hex::decode(private_key_hex.trim())
            .map_err(|e| PeerError::InvalidKey(format!("private key is not hex: {e}")))?;

        if raw.len() != 32 && raw.len() != 64 {
            let len = raw.len();
            raw.zeroize();
            return Err(PeerError::InvalidKey(format!(
                "private key must be 32 or 64 bytes, got {len}"
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&raw[..32]);
        raw.zeroize();

        let kp = Self::from_signing_key_bytes(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| PeerError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    /// Return a reference to the signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Return the verifying (public) key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the verifying key bytes.
    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Return the private key (seed) as lowercase hex.
    pub fn private_key_hex(&self) -> String {
        let mut bytes = self.signing_key.to_bytes();
        let out = hex::encode(bytes);
        bytes.zeroize();
        out
    }

    /// Return the public key as lowercase hex.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.verifying_key_bytes())
    }
}
