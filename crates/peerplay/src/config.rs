//! Wallet configuration: where data lives and where deep links point.
//!
//! Resolution order, later wins:
//!
//! 1. Defaults: `$HOME/.peerplay` and `http://localhost:5173/`.
//! 2. Environment: `PEERPLAY_HOME`, `PEERPLAY_BASE_URL`.
//! 3. Explicit overrides (CLI flags).

use std::path::PathBuf;

use url::Url;

use crate::error::{PeerError, Result};
use crate::exchange::parse_base_url;

/// Storage key of the local identity (single mode).
pub const IDENTITY_KEY: &str = "peerplay-identity";
/// Storage key of form definitions.
pub const FORMS_KEY: &str = "peerplay-forms";
/// Storage key of requested claims.
pub const CLAIMS_KEY: &str = "peerplay-claims";
/// Storage key of credentials this wallet issued.
pub const ISSUED_KEY: &str = "peerplay-issued";
/// Storage key of credentials received from peers.
pub const RECEIVED_KEY: &str = "peerplay-vcs";

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "PEERPLAY_HOME";
/// Environment variable overriding the deep-link base URL.
pub const BASE_URL_ENV: &str = "PEERPLAY_BASE_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173/";

const DEFAULT_DIR_NAME: &str = ".peerplay";

/// The five storage keys, one per managed collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub identity: String,
    pub forms: String,
    pub claims: String,
    pub issued: String,
    pub received: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            identity: IDENTITY_KEY.into(),
            forms: FORMS_KEY.into(),
            claims: CLAIMS_KEY.into(),
            issued: ISSUED_KEY.into(),
            received: RECEIVED_KEY.into(),
        }
    }
}

/// Resolved wallet configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerConfig {
    pub home: PathBuf,
    pub base_url: Url,
    pub keys: StorageKeys,
}

impl PeerConfig {
    /// Configuration rooted at `home` with the default base URL.
    pub fn new(home: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            home: home.into(),
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            keys: StorageKeys::default(),
        })
    }

    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve using `lookup` for environment variables.
    ///
    /// # Errors
    ///
    /// `PeerError::MissingPrerequisite` if neither `PEERPLAY_HOME` nor
    /// `HOME` is set; `PeerError::InvalidLink` for a malformed base URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::resolve_with(lookup, None, None)
    }

    /// Resolve from the process environment, letting explicit values win.
    ///
    /// `HOME` is only required when no data directory is given either way.
    pub fn resolve(home: Option<PathBuf>, base_url: Option<&str>) -> Result<Self> {
        Self::resolve_with(|name| std::env::var(name).ok(), home, base_url)
    }

    fn resolve_with(
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let home = match home.or_else(|| non_empty(HOME_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => non_empty("HOME")
                .map(|h| PathBuf::from(h).join(DEFAULT_DIR_NAME))
                .ok_or_else(|| {
                    PeerError::MissingPrerequisite(format!(
                        "HOME is not set; set {HOME_ENV} or pass --home"
                    ))
                })?,
        };

        let mut config = Self::new(home)?;
        if let Some(base) = base_url.map(str::to_string).or_else(|| non_empty(BASE_URL_ENV)) {
            config.base_url = parse_base_url(&base)?;
        }
        Ok(config)
    }

    /// Apply explicit overrides, e.g. from command-line flags.
    pub fn with_overrides(mut self, home: Option<PathBuf>, base_url: Option<&str>) -> Result<Self> {
        if let Some(home) = home {
            self.home = home;
        }
        if let Some(base) = base_url {
            self.base_url = parse_base_url(base)?;
        }
        Ok(self)
    }
}
