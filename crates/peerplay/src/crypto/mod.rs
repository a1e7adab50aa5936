//! Cryptographic primitives for PeerPlay.
//!
//! This module provides:
//! - Ed25519 key generation with hex import/export
//! - Ed25519 signing and verification with base64url signatures

pub mod keys;
pub mod signing;
