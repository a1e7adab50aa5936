//! Exchange formats: exported JSON files and deep links.
//!
//! Claims and credentials travel between peers as links whose query
//! parameter carries the JSON value:
//!
//! ```text
//! {base}attest?claim=<url-encoded claim JSON>
//! {base}verify?vc=<url-encoded credential JSON>
//! ```
//!
//! Older links carry the credential as base64 JSON instead; decoding
//! accepts both.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::{PeerError, Result};
use crate::import::ImportSource;
use crate::resource::{ClaimDefinition, VerifiableCredential};
use crate::storage::backend::write_atomic;

const ATTEST_PATH: &str = "attest";
const VERIFY_PATH: &str = "verify";
const CLAIM_PARAM: &str = "claim";
const VC_PARAM: &str = "vc";

/// The value carried by a decoded deep link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkPayload {
    /// A requested claim, to be signed on the attest page.
    Claim(Value),
    /// A credential, to be checked on the verify page.
    Credential(Value),
}

impl LinkPayload {
    /// The carried JSON as an import source.
    pub fn into_source(self) -> ImportSource {
        match self {
            Self::Claim(v) | Self::Credential(v) => ImportSource::Value(v),
        }
    }
}

// ── Files ─────────────────────────────────────────────────────────────────────

/// Serialize `value` as pretty-printed JSON.
pub fn export_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| PeerError::SerializationError(e.to_string()))
}

/// Write `value` as pretty JSON to `path`, replacing any existing file.
pub fn export_to_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<PathBuf> {
    let json = export_json(value)?;
    write_atomic(path, json.as_bytes())?;
    Ok(path.to_path_buf())
}

// ── Deep links ────────────────────────────────────────────────────────────────

/// Parse a base URL, making sure it ends with `/` so relative pages join
/// under it rather than replacing its last segment.
pub fn parse_base_url(base: &str) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| PeerError::InvalidLink(format!("bad base URL `{base}`: {e}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Link asking a peer to attest `claim`.
pub fn claim_link(base: &Url, claim: &ClaimDefinition) -> Result<Url> {
    build_link(base, ATTEST_PATH, CLAIM_PARAM, claim)
}

/// Link handing `vc` to a peer for verification. The local `verified`
/// tag is not shared.
pub fn credential_link(base: &Url, vc: &VerifiableCredential) -> Result<Url> {
    build_link(base, VERIFY_PATH, VC_PARAM, &vc.untagged())
}

fn build_link<T: Serialize>(base: &Url, page: &str, param: &str, value: &T) -> Result<Url> {
    let json =
        serde_json::to_string(value).map_err(|e| PeerError::SerializationError(e.to_string()))?;
    let mut url = base
        .join(page)
        .map_err(|e| PeerError::InvalidLink(format!("cannot build link: {e}")))?;
    url.query_pairs_mut().clear().append_pair(param, &json);
    Ok(url)
}

/// Extract the claim or credential carried by a deep link.
///
/// # Errors
///
/// `PeerError::InvalidLink` if the text is not a URL, has neither a
/// `claim` nor a `vc` parameter, or the parameter is not JSON.
pub fn decode_link(link: &str) -> Result<LinkPayload> {
    let url = Url::parse(link.trim())
        .map_err(|e| PeerError::InvalidLink(format!("not a URL: {e}")))?;

    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            CLAIM_PARAM => {
                let v = serde_json::from_str(&value)
                    .map_err(|e| PeerError::InvalidLink(format!("claim is not JSON: {e}")))?;
                return Ok(LinkPayload::Claim(v));
            }
            VC_PARAM => return decode_vc_param(&value).map(LinkPayload::Credential),
            _ => {}
        }
    }

    Err(PeerError::InvalidLink(
        "link carries neither a claim nor a credential".into(),
    ))
}

/// Plain JSON first, then the legacy base64 form.
fn decode_vc_param(value: &str) -> Result<Value> {
    if let Ok(v) = serde_json::from_str(value) {
        return Ok(v);
    }
    let trimmed = value.trim();
    let bytes = STANDARD
        .decode(trimmed)
        .or_else(|_| URL_SAFE_NO_PAD.decode(trimmed.trim_end_matches('=')))
        .map_err(|_| PeerError::InvalidLink("credential is neither JSON nor base64".into()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PeerError::InvalidLink(format!("credential is not JSON: {e}")))
}
