//! At-rest field encryption for sensitive identifiers.
//!
//! Aadhaar and PAN numbers are never persisted or returned in the clear.
//! [`FieldCipher`] turns a plaintext identifier into an opaque hex token
//! (AES-256-GCM, random 96-bit nonce prepended) and back. The token is
//! self-contained: decryption needs only the key.

pub mod field;

pub use field::{CryptoError, FieldCipher};
