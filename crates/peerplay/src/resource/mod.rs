//! Resource kinds and their shape validators.
//!
//! Every kind the wallet manages (identities, form definitions, claim
//! definitions, verifiable credentials) is a plain serializable record
//! implementing [`Resource`]. Validation is structural: the required
//! fields must be present with the right JSON type, extra fields are
//! accepted and kept.

pub mod claim;
pub mod credential;
pub mod form;
pub mod identity;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

pub use claim::{resolve_form, ClaimDefinition, ClaimSubject, FormLookup};
pub use credential::{CredentialStatus, VerifiableCredential};
pub use form::{FormBuilder, FormDefinition, FormField};
pub use identity::StoredIdentity;

/// The four resource kinds sharing the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Identity,
    FormDefinition,
    ClaimDefinition,
    VerifiableCredential,
}

impl ResourceKind {
    /// Return a stable string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::FormDefinition => "form definition",
            Self::ClaimDefinition => "claim definition",
            Self::VerifiableCredential => "verifiable credential",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a storage key holds its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// At most one value; saving overwrites.
    Single,
    /// An ordered sequence; saving appends.
    List,
}

/// Outcome of checking an arbitrary JSON value against a resource shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Conformance<T> {
    Valid(T),
    Invalid(String),
}

impl<T> Conformance<T> {
    /// Return `true` if the candidate conformed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Convert into a `Result`, keeping the rejection reason.
    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            Self::Valid(v) => Ok(v),
            Self::Invalid(reason) => Err(reason),
        }
    }
}

/// A record managed by the resource lifecycle.
pub trait Resource: Clone + Serialize + DeserializeOwned {
    /// Kind tag, used in log lines and error messages.
    const KIND: ResourceKind;

    /// How this kind is normally kept under its storage key.
    const MODE: StoreMode = StoreMode::List;

    /// Check `candidate` against this kind's required shape.
    ///
    /// Pure and synchronous. Must reject non-objects and objects missing a
    /// required field; must accept unknown extra fields.
    fn conform(candidate: &Value) -> Conformance<Self>;

    /// Boolean form of [`Resource::conform`].
    fn validate(candidate: &Value) -> bool {
        Self::conform(candidate).is_valid()
    }
}

// ── Shape-check helpers ───────────────────────────────────────────────────────

/// Require `candidate` to be a JSON object.
pub(crate) fn require_object<'a>(
    candidate: &'a Value,
    what: &str,
) -> std::result::Result<&'a Map<String, Value>, String> {
    candidate
        .as_object()
        .ok_or_else(|| format!("{what} must be a JSON object"))
}

/// Require `obj[field]` to be a string.
pub(crate) fn require_str(
    obj: &Map<String, Value>,
    field: &str,
) -> std::result::Result<(), String> {
    match obj.get(field) {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(format!("field `{field}` must be a string")),
        None => Err(format!("missing required field `{field}`")),
    }
}

/// Require `obj[field]` to be an object.
pub(crate) fn require_map<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> std::result::Result<&'a Map<String, Value>, String> {
    match obj.get(field) {
        Some(Value::Object(m)) => Ok(m),
        Some(_) => Err(format!("field `{field}` must be an object")),
        None => Err(format!("missing required field `{field}`")),
    }
}

/// Require `obj[field]` to be an array.
pub(crate) fn require_array<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> std::result::Result<&'a Vec<Value>, String> {
    match obj.get(field) {
        Some(Value::Array(a)) => Ok(a),
        Some(_) => Err(format!("field `{field}` must be an array")),
        None => Err(format!("missing required field `{field}`")),
    }
}

/// Allow `obj[field]` to be absent, but if present it must be a string.
pub(crate) fn optional_str(
    obj: &Map<String, Value>,
    field: &str,
) -> std::result::Result<(), String> {
    match obj.get(field) {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(format!("field `{field}` must be a string")),
    }
}

/// Deserialize a shape-checked value into its typed record.
pub(crate) fn decode<T: DeserializeOwned>(candidate: &Value) -> Conformance<T> {
    match serde_json::from_value(candidate.clone()) {
        Ok(v) => Conformance::Valid(v),
        Err(e) => Conformance::Invalid(e.to_string()),
    }
}
