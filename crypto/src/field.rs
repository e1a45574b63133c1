//! AES-256-GCM field encryption with hex token encoding.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use thiserror::Error;

/// GCM nonce length in bytes (96 bits).
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("encryption key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("encryption key is not valid hex")]
    InvalidKeyEncoding,

    #[error("field encryption failed")]
    Encrypt,

    #[error("field decryption failed: token is malformed or the key is wrong")]
    Decrypt,

    #[error("decrypted field is not valid UTF-8")]
    NotUtf8,
}

/// Reversible transform for sensitive identifier fields.
///
/// `decrypt(encrypt(x)) == x` for any UTF-8 string `x`. Tokens embed their
/// nonce, so encrypting the same plaintext twice yields different tokens.
#[derive(Clone)]
pub struct FieldCipher {
    key: Key<Aes256Gcm>,
}

impl FieldCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: Key::<Aes256Gcm>::from(key),
        }
    }

    /// Build a cipher from a 64-character hex key string (as configured via
    /// environment).
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key).map_err(|_| CryptoError::InvalidKeyEncoding)?;
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength(bytes.len()))?;
        Ok(Self::new(key))
    }

    /// Encrypt a plaintext field into an opaque hex token.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let cipher = Aes256Gcm::new(&self.key);
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut token = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(hex::encode(token))
    }

    /// Decrypt a token produced by [`FieldCipher::encrypt`].
    pub fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        let raw = hex::decode(token).map_err(|_| CryptoError::Decrypt)?;
        if raw.len() <= NONCE_LEN {
            return Err(CryptoError::Decrypt);
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let cipher = Aes256Gcm::new(&self.key);
        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::NotUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new([7u8; 32])
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let c = cipher();
        let token = c.encrypt("123412341234").unwrap();
        assert_ne!(token, "123412341234");
        assert_eq!(c.decrypt(&token).unwrap(), "123412341234");
    }

    #[test]
    fn same_plaintext_yields_distinct_tokens() {
        let c = cipher();
        let a = c.encrypt("ABCDE1234F").unwrap();
        let b = c.encrypt("ABCDE1234F").unwrap();
        assert_ne!(a, b);
        assert_eq!(c.decrypt(&a).unwrap(), c.decrypt(&b).unwrap());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let token = cipher().encrypt("123412341234").unwrap();
        let other = FieldCipher::new([9u8; 32]);
        assert!(matches!(other.decrypt(&token), Err(CryptoError::Decrypt)));
    }

    #[test]
    fn tampered_token_fails_authentication() {
        let c = cipher();
        let mut token = c.encrypt("123412341234").unwrap();
        // Flip a nibble in the ciphertext portion.
        let flipped = if token.ends_with('0') { '1' } else { '0' };
        token.pop();
        token.push(flipped);
        assert!(c.decrypt(&token).is_err());
    }

    #[test]
    fn truncated_token_is_rejected() {
        let c = cipher();
        assert!(c.decrypt("abcd").is_err());
        assert!(c.decrypt("not hex at all").is_err());
    }

    #[test]
    fn hex_key_construction() {
        let hex_key = hex::encode([7u8; 32]);
        let c = FieldCipher::from_hex_key(&hex_key).unwrap();
        let token = c.encrypt("x").unwrap();
        assert_eq!(cipher().decrypt(&token).unwrap(), "x");

        assert!(matches!(
            FieldCipher::from_hex_key("deadbeef"),
            Err(CryptoError::InvalidKeyLength(4))
        ));
        assert!(FieldCipher::from_hex_key("zz").is_err());
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_arbitrary_strings(s in "\\PC{0,64}") {
            let c = cipher();
            let token = c.encrypt(&s).unwrap();
            prop_assert_eq!(c.decrypt(&token).unwrap(), s);
        }
    }
}
