//! Symmetric cipher engine.
//!
//! Repository-form symmetric content is an AES-256-GCM container:
//!
//! ```text
//! [COFFERv1][12-byte nonce][variable-length ciphertext + 16-byte GCM tag]
//! ```
//!
//! The magic header identifies the container when classifying arbitrary
//! historical content and carries the format version.
//!
//! The nonce is not random: it is HMAC-SHA-256 of the plaintext under the
//! encryption key, truncated to 96 bits. Encryption is therefore
//! deterministic: the clean filter runs on every `git add` and `git status`,
//! and the repository form of an unchanged file must not change between runs.
//! The usual GCM nonce-reuse caveat reduces to revealing that two files (or
//! two revisions) under the same key hold equal plaintext, which is the
//! accepted trade-off for a deterministic filter.

use crate::error::{CofferError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const KEY_SIZE: usize = 32; // 256 bits
pub const NONCE_SIZE: usize = 12; // 96 bits for GCM

/// Fixed, versioned marker prefix of the symmetric container.
pub const MAGIC_HEADER: &[u8] = b"COFFERv1";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Debug)]
pub struct SecretKey {
    key: [u8; KEY_SIZE],
}

impl SecretKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Create a key from existing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CofferError::InvalidKeyFormat);
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self { key })
    }

    /// Decode a key from its base64 text form (keyring entries, `--key` flag).
    pub fn decode(text: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|_| CofferError::InvalidKeyFormat)?;
        Self::from_bytes(&bytes)
    }

    /// The base64 text form stored in the keyring.
    pub fn encode(&self) -> String {
        BASE64.encode(self.key)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Key identifier: hex SHA-256 of the raw key bytes.
    pub fn key_id(&self) -> String {
        hex::encode(Sha256::digest(self.key))
    }

    /// Encrypt data into the versioned container. Deterministic: the same
    /// key and plaintext always produce identical bytes.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CofferError::Crypto(e.to_string()))?;

        let nonce_bytes = self.derive_nonce(plaintext)?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| CofferError::Crypto(e.to_string()))?;

        // Format: MAGIC_HEADER + nonce + ciphertext
        let mut result = Vec::with_capacity(MAGIC_HEADER.len() + NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(MAGIC_HEADER);
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(result)
    }

    /// Decrypt a container produced by [`SecretKey::encrypt`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let min_size = MAGIC_HEADER.len() + NONCE_SIZE;
        if ciphertext.len() < min_size {
            return Err(CofferError::Crypto("ciphertext too short".into()));
        }

        if &ciphertext[..MAGIC_HEADER.len()] != MAGIC_HEADER {
            return Err(CofferError::Crypto("invalid container header".into()));
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CofferError::Crypto(e.to_string()))?;

        let data = &ciphertext[MAGIC_HEADER.len()..];
        let (nonce_bytes, encrypted_data) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, encrypted_data)
            .map_err(|e| CofferError::Crypto(e.to_string()))?;

        Ok(plaintext)
    }

    // HMAC-SHA-256(key, plaintext), truncated to the GCM nonce size.
    fn derive_nonce(&self, plaintext: &[u8]) -> Result<[u8; NONCE_SIZE]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key)
            .map_err(|e| CofferError::Crypto(e.to_string()))?;
        mac.update(plaintext);
        let digest = mac.finalize().into_bytes();

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&digest[..NONCE_SIZE]);
        Ok(nonce)
    }
}
