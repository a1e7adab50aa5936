//! Import channel — turn a user-supplied source into a validated resource.
//!
//! Sources are either bytes (a selected file, a decoded deep-link
//! parameter) or an in-memory JSON value. Both paths end at the same
//! validator, so a value only becomes "imported" once it has the right
//! shape.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ImportError;
use crate::resource::{Conformance, Resource};

/// Where an import candidate comes from.
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// A file on disk, read as UTF-8 JSON.
    File(PathBuf),
    /// Raw file contents, read as UTF-8 JSON.
    Bytes(Vec<u8>),
    /// JSON text already held as a string.
    Text(String),
    /// An already-decoded JSON value, e.g. built by a local form.
    Value(Value),
}

impl ImportSource {
    /// Read every byte from `reader` into a byte source.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Unreadable` if the reader fails.
    pub fn from_reader(mut reader: impl Read) -> std::result::Result<Self, ImportError> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| ImportError::Unreadable(e.to_string()))?;
        Ok(Self::Bytes(buf))
    }

    /// Convenience constructor for a file path.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

/// Parse and validate `source` as a `T`.
///
/// # Errors
///
/// - `ImportError::Unreadable` if the file cannot be read or is not UTF-8.
/// - `ImportError::Parse` if the text is not JSON.
/// - `ImportError::InvalidFormat` if the JSON does not have `T`'s shape.
pub fn import_from<T: Resource>(source: ImportSource) -> std::result::Result<T, ImportError> {
    let value = match source {
        ImportSource::File(path) => {
            let bytes = std::fs::read(&path)
                .map_err(|e| ImportError::Unreadable(format!("{}: {e}", path.display())))?;
            parse_bytes(bytes)?
        }
        ImportSource::Bytes(bytes) => parse_bytes(bytes)?,
        ImportSource::Text(text) => parse_text(&text)?,
        ImportSource::Value(value) => value,
    };

    match T::conform(&value) {
        Conformance::Valid(v) => Ok(v),
        Conformance::Invalid(reason) => Err(ImportError::InvalidFormat(format!(
            "not a {}: {reason}",
            T::KIND
        ))),
    }
}

fn parse_bytes(bytes: Vec<u8>) -> std::result::Result<Value, ImportError> {
    let text = String::from_utf8(bytes).map_err(|e| ImportError::Unreadable(e.to_string()))?;
    parse_text(&text)
}

fn parse_text(text: &str) -> std::result::Result<Value, ImportError> {
    // Tolerate a UTF-8 byte order mark from editors that write one.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(|e| ImportError::Parse(e.to_string()))
}
