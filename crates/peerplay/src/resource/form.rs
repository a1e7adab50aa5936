//! Form definitions: the shape of a claim a user wants requested or issued.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    decode, optional_str, require_array, require_object, require_str, Conformance, Resource,
    ResourceKind,
};
use crate::error::{PeerError, Result};

/// Field type assigned to every field authored locally.
pub const DEFAULT_FIELD_TYPE: &str = "string";

/// A user-defined credential form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One named field of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(
        rename = "type",
        default = "default_field_type",
        deserialize_with = "null_as_default_type"
    )]
    pub field_type: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_field_type() -> String {
    DEFAULT_FIELD_TYPE.to_string()
}

fn null_as_default_type<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_field_type))
}

impl FormDefinition {
    /// File name used when exporting this form.
    pub fn file_name(&self) -> String {
        if self.id.is_empty() {
            format!("{}.json", slugify(&self.title))
        } else {
            format!("{}.json", self.id)
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Resource for FormDefinition {
    const KIND: ResourceKind = ResourceKind::FormDefinition;

    fn conform(candidate: &Value) -> Conformance<Self> {
        let check = || -> std::result::Result<(), String> {
            let obj = require_object(candidate, "form definition")?;
            require_str(obj, "id")?;
            require_str(obj, "title")?;
            optional_str(obj, "description")?;
            for (i, field) in require_array(obj, "fields")?.iter().enumerate() {
                let f = require_object(field, &format!("fields[{i}]"))?;
                require_str(f, "name").map_err(|e| format!("fields[{i}]: {e}"))?;
                optional_str(f, "type").map_err(|e| format!("fields[{i}]: {e}"))?;
            }
            Ok(())
        };
        match check() {
            Ok(()) => decode(candidate),
            Err(reason) => Conformance::Invalid(reason),
        }
    }
}

/// Lower-case `title` and replace every whitespace run with `-`.
///
/// Leading and trailing runs are replaced too, so `" Foo "` becomes
/// `"-foo-"`; ids authored elsewhere are derived the same way.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

// ── FormBuilder ───────────────────────────────────────────────────────────────

/// Interactive authoring of a new form definition.
#[derive(Debug, Default, Clone)]
pub struct FormBuilder {
    title: String,
    description: String,
    fields: Vec<String>,
}

impl FormBuilder {
    /// Start a form with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the free-text description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a field. Blank names are ignored; names are trimmed.
    pub fn field(mut self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        if !name.is_empty() {
            self.fields.push(name.to_string());
        }
        self
    }

    /// Remove the field at `index`, if any.
    pub fn remove_field(mut self, index: usize) -> Self {
        if index < self.fields.len() {
            self.fields.remove(index);
        }
        self
    }

    /// Build the form. Requires a title and at least one field.
    pub fn build(self) -> Result<FormDefinition> {
        if self.title.trim().is_empty() {
            return Err(PeerError::InvalidForm("a form needs a title".into()));
        }
        if self.fields.is_empty() {
            return Err(PeerError::InvalidForm("a form needs at least one field".into()));
        }

        Ok(FormDefinition {
            id: slugify(&self.title),
            title: self.title,
            description: Some(self.description),
            fields: self
                .fields
                .into_iter()
                .map(|name| FormField {
                    name,
                    field_type: default_field_type(),
                    allowed: None,
                    extra: Map::new(),
                })
                .collect(),
            extra: Map::new(),
        })
    }
}
