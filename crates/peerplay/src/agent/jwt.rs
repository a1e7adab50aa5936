//! Compact JWS (JWT) encoding with EdDSA over Ed25519.
//!
//! `base64url(header) . base64url(payload) . base64url(signature)`, all
//! segments unpadded. The header is always `{"alg":"EdDSA","typ":"JWT"}`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde_json::{json, Value};

use crate::crypto::signing;
use crate::error::{PeerError, Result};

/// The only signing algorithm produced or accepted.
pub const ALG_EDDSA: &str = "EdDSA";

/// A token split into its parts, signature not yet checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedJwt {
    pub header: Value,
    pub payload: Value,
    signing_input: String,
    signature: String,
}

impl DecodedJwt {
    /// Check the signature against `key`.
    ///
    /// # Errors
    ///
    /// `PeerError::SignatureInvalid` on mismatch, `PeerError::InvalidKey`
    /// if the signature segment is malformed.
    pub fn verify(&self, key: &VerifyingKey) -> Result<()> {
        signing::verify_from_base64url(key, self.signing_input.as_bytes(), &self.signature)
    }

    /// The `alg` header value, if any.
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// A string claim of the payload.
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }
}

/// Sign `payload` into a compact JWS.
pub fn encode(payload: &Value, key: &SigningKey) -> Result<String> {
    let header = json!({"alg": ALG_EDDSA, "typ": "JWT"});
    let header = serde_json::to_vec(&header)
        .map_err(|e| PeerError::SerializationError(e.to_string()))?;
    let payload =
        serde_json::to_vec(payload).map_err(|e| PeerError::SerializationError(e.to_string()))?;

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let signature = signing::sign_to_base64url(key, signing_input.as_bytes());
    Ok(format!("{signing_input}.{signature}"))
}

/// Split and decode a compact JWS without checking its signature.
///
/// # Errors
///
/// `PeerError::Agent` if the token is not three base64url segments of
/// JSON objects.
pub fn decode(token: &str) -> Result<DecodedJwt> {
    let mut parts = token.trim().split('.');
    let (Some(header_b64), Some(payload_b64), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PeerError::Agent("JWT must have three segments".into()));
    };

    let header = decode_segment(header_b64, "header")?;
    let payload = decode_segment(payload_b64, "payload")?;

    Ok(DecodedJwt {
        header,
        payload,
        signing_input: format!("{header_b64}.{payload_b64}"),
        signature: signature.to_string(),
    })
}

fn decode_segment(segment: &str, what: &str) -> Result<Value> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| PeerError::Agent(format!("JWT {what} is not base64url: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| PeerError::Agent(format!("JWT {what} is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(PeerError::Agent(format!("JWT {what} must be a JSON object")));
    }
    Ok(value)
}
