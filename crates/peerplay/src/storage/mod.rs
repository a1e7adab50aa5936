//! Storage layer for identities, forms, claims, and credentials.
//!
//! Every resource kind occupies one storage key holding a JSON value.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.peerplay/`:
//!
//! ```text
//! ~/.peerplay/
//! ├── peerplay-identity.json   — single identity object
//! ├── peerplay-forms.json      — array of form definitions
//! ├── peerplay-claims.json     — array of requested claims
//! ├── peerplay-issued.json     — array of credentials this wallet signed
//! └── peerplay-vcs.json        — array of credentials received from peers
//! ```
//!
//! # Modules
//!
//! - [`backend`] — raw key-value backends (file and in-memory).
//! - [`store`] — typed, validated load/save/clear in single or list mode.

pub mod backend;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use store::{PersistenceStore, Stored};
