//! Error types for PeerPlay.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

/// Peer identity and credential error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    #[error("Agent failure: {0}")]
    Agent(String),

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// User-visible failures of the import channel.
///
/// None of these are fatal: the previously imported value is left in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    /// The source could not be read as UTF-8 text.
    #[error("error reading file: {0}")]
    Unreadable(String),

    /// The text is not JSON.
    #[error("file is not valid JSON: {0}")]
    Parse(String),

    /// The JSON does not have the shape required for the resource kind.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PeerError>;
