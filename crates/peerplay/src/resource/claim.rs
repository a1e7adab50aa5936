//! Claim definitions: a filled-in, unsigned instance of a form.
//!
//! A claim points at its form only by `formId`. The reference is weak:
//! the form may have been removed since, so resolution returns an explicit
//! [`FormLookup::NotFound`] instead of failing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::FormDefinition;
use super::{decode, require_map, require_object, require_str, Conformance, Resource, ResourceKind};
use crate::error::{PeerError, Result};

/// A claim awaiting a peer's signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDefinition {
    pub form_id: String,
    pub credential_subject: ClaimSubject,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The subject of a claim: its DID plus arbitrary keyed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSubject {
    pub id: String,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl ClaimDefinition {
    /// Fill `form` for `subject_did` with the given field values.
    ///
    /// Every key of `values` must name a field of the form.
    pub fn fill(
        form: &FormDefinition,
        subject_did: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut subject = Map::new();
        for (name, value) in values {
            let field = form.field(name).ok_or_else(|| {
                PeerError::InvalidForm(format!("form `{}` has no field `{name}`", form.id))
            })?;
            if let Some(allowed) = &field.allowed {
                if !allowed.iter().any(|a| a == value) {
                    return Err(PeerError::InvalidForm(format!(
                        "`{value}` is not an allowed value for `{name}`"
                    )));
                }
            }
            subject.insert(name.clone(), Value::String(value.clone()));
        }

        Ok(Self {
            form_id: form.id.clone(),
            credential_subject: ClaimSubject {
                id: subject_did.to_string(),
                values: subject,
            },
            extra: Map::new(),
        })
    }

    /// File name used when exporting this claim.
    pub fn file_name(&self) -> String {
        format!("{}_claim.json", self.form_id)
    }
}

impl Resource for ClaimDefinition {
    const KIND: ResourceKind = ResourceKind::ClaimDefinition;

    fn conform(candidate: &Value) -> Conformance<Self> {
        let check = || -> std::result::Result<(), String> {
            let obj = require_object(candidate, "claim definition")?;
            require_str(obj, "formId")?;
            let subject = require_map(obj, "credentialSubject")?;
            require_str(subject, "id").map_err(|e| format!("credentialSubject: {e}"))?;
            Ok(())
        };
        match check() {
            Ok(()) => decode(candidate),
            Err(reason) => Conformance::Invalid(reason),
        }
    }
}

// ── Form resolution ───────────────────────────────────────────────────────────

/// Outcome of resolving a claim's `formId` against the stored forms.
#[derive(Debug, Clone, PartialEq)]
pub enum FormLookup<'a> {
    Found(&'a FormDefinition),
    NotFound(String),
}

impl<'a> FormLookup<'a> {
    /// Convert into a `Result`, mapping a miss to `PeerError::NotFound`.
    pub fn into_result(self) -> Result<&'a FormDefinition> {
        match self {
            Self::Found(form) => Ok(form),
            Self::NotFound(id) => Err(PeerError::NotFound(format!("form not found: {id}"))),
        }
    }
}

/// Find the form whose `id` equals `form_id`. The first match wins.
pub fn resolve_form<'a>(forms: &'a [FormDefinition], form_id: &str) -> FormLookup<'a> {
    forms
        .iter()
        .find(|f| f.id == form_id)
        .map_or_else(|| FormLookup::NotFound(form_id.to_string()), FormLookup::Found)
}
