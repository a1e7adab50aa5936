//! PeerPlay — local-first decentralized identities and verifiable credentials.
//!
//! Generates `did:key` identities, lets users define custom claim forms,
//! has peers attest filled claims as JWT-signed credentials, and verifies
//! received credentials. Everything is kept in local storage and moved
//! between peers as JSON files or deep links.
//!
//! Identities, forms, claims and credentials all share one lifecycle,
//! implemented once by [`manager::ResourceManager`]: import a candidate,
//! validate it, commit it to storage, evict it.

pub mod agent;
pub mod config;
pub mod crypto;
pub mod did;
pub mod error;
pub mod exchange;
pub mod import;
pub mod manager;
pub mod resource;
pub mod storage;
pub mod time;
pub mod wallet;

// Re-export primary types
pub use error::{ImportError, PeerError, Result};
pub use import::{import_from, ImportSource};
pub use manager::ResourceManager;
pub use wallet::Wallet;

// Re-export configuration
pub use config::{PeerConfig, StorageKeys};

// Re-export resource types
pub use resource::{
    resolve_form, ClaimDefinition, ClaimSubject, Conformance, CredentialStatus, FormBuilder,
    FormDefinition, FormField, FormLookup, Resource, ResourceKind, StoreMode, StoredIdentity,
    VerifiableCredential,
};

// Re-export storage types
pub use storage::{FileBackend, MemoryBackend, PersistenceStore, StorageBackend, Stored};

// Re-export agent types
pub use agent::{
    CreatedIdentity, CredentialAgent, CredentialDraft, ImportedIdentity, KeyInfo, LocalAgent,
    PrivateKeyInfo, ProofFormat, VerificationResult,
};

// Re-export exchange types
pub use exchange::LinkPayload;
