//! AES-256-GCM with a key hashed (SHA-256) to 32 bytes if shorter, or a
//! freshly generated random key if none is configured. Output is base64 of
//! `nonce ∥ ciphertext`, nonce first so decryption can slice it back off.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::SecurityError;

const NONCE_LEN: usize = 12;

pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    /// Derives a 32-byte key from `key_material` via SHA-256. `None` draws a
    /// fresh random key, which makes ciphertexts irrecoverable across
    /// process restarts — callers needing persistence must configure a key.
    pub fn new(key_material: Option<&[u8]>) -> Self {
        let key_bytes = match key_material {
            Some(bytes) => {
                let mut hasher = Sha256::new();
                hasher.update(bytes);
                hasher.finalize()
            }
            None => {
                let mut raw = [0u8; 32];
                OsRng.fill_bytes(&mut raw);
                let mut hasher = Sha256::new();
                hasher.update(raw);
                hasher.finalize()
            }
        };
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<String, SecurityError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext)
            .map_err(|e| SecurityError::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(combined))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Vec<u8>, SecurityError> {
        let combined = BASE64
            .decode(encoded)
            .map_err(|e| SecurityError::Decryption(e.to_string()))?;
        if combined.len() < NONCE_LEN {
            return Err(SecurityError::Decryption("payload shorter than nonce".into()));
        }
        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| SecurityError::Decryption(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_explicit_key() {
        let enc = Encryptor::new(Some(b"a shared tenant secret"));
        let cipher = enc.encrypt(b"hello world").unwrap();
        let plain = enc.decrypt(&cipher).unwrap();
        assert_eq!(plain, b"hello world");
    }

    #[test]
    fn ciphertext_differs_between_calls_due_to_random_nonce() {
        let enc = Encryptor::new(Some(b"key"));
        let a = enc.encrypt(b"same input").unwrap();
        let b = enc.encrypt(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let enc = Encryptor::new(Some(b"key"));
        assert!(enc.decrypt("short").is_err());
    }
}
