// ABOUTME: AES-256-GCM encryption of OAuth tokens at rest
// ABOUTME: Nonce-prefixed base64 ciphertext bound to the owning credential row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use base64::{engine::general_purpose, Engine as _};
use outreach_core::errors::DatabaseError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Encrypts and decrypts token columns
///
/// Ciphertext layout is `base64([12-byte nonce][ciphertext + tag])`. The
/// associated data binds each value to its row, so a ciphertext copied to another
/// (user, namespace) row fails to decrypt.
pub struct TokenCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl TokenCipher {
    /// Create a cipher from a 32-byte key
    ///
    /// # Errors
    ///
    /// Returns an error if the key is rejected by the AEAD implementation
    pub fn new(encryption_key: &[u8; 32]) -> Result<Self, DatabaseError> {
        let unbound = UnboundKey::new(&AES_256_GCM, encryption_key)
            .map_err(|_| DatabaseError::Encryption("invalid AES-256 key".to_owned()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt `plaintext` for the row identified by `aad`
    ///
    /// # Errors
    ///
    /// Returns an error if nonce generation or sealing fails
    pub fn encrypt(&self, plaintext: &str, aad: &str) -> Result<String, DatabaseError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| DatabaseError::Encryption("nonce generation failed".to_owned()))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut data = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::from(aad.as_bytes()), &mut data)
            .map_err(|_| DatabaseError::Encryption("sealing failed".to_owned()))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend(data);
        Ok(general_purpose::STANDARD.encode(combined))
    }

    /// Decrypt a value produced by [`Self::encrypt`] with the same `aad`
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid base64, is truncated, was
    /// produced with another key or row, or is not UTF-8
    pub fn decrypt(&self, encoded: &str, aad: &str) -> Result<String, DatabaseError> {
        let combined = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| DatabaseError::Encryption(format!("invalid base64: {e}")))?;
        if combined.len() < NONCE_LEN {
            return Err(DatabaseError::Encryption("ciphertext too short".to_owned()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| DatabaseError::Encryption("invalid nonce".to_owned()))?;

        let mut data = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(aad.as_bytes()), &mut data)
            .map_err(|_| DatabaseError::Encryption("authentication failed".to_owned()))?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| DatabaseError::Encryption(format!("invalid UTF-8: {e}")))
    }
}

/// Generate a random 32-byte key, base64 encoded
///
/// # Errors
///
/// Returns an error if the system RNG fails
pub fn generate_encryption_key() -> Result<String, DatabaseError> {
    let mut key = [0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| DatabaseError::Encryption("key generation failed".to_owned()))?;
    Ok(general_purpose::STANDARD.encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_is_randomized_and_reversible() {
        let cipher = TokenCipher::new(&[1u8; 32]).expect("cipher");
        let first = cipher.encrypt("access-token", "row-a").expect("encrypt");
        let second = cipher.encrypt("access-token", "row-a").expect("encrypt");
        assert_ne!(first, second);
        assert_eq!(cipher.decrypt(&first, "row-a").expect("decrypt"), "access-token");
    }

    #[test]
    fn test_ciphertext_is_bound_to_row() {
        let cipher = TokenCipher::new(&[1u8; 32]).expect("cipher");
        let sealed = cipher.encrypt("access-token", "row-a").expect("encrypt");
        assert!(cipher.decrypt(&sealed, "row-b").is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let sealed = TokenCipher::new(&[1u8; 32])
            .expect("cipher")
            .encrypt("secret", "row")
            .expect("encrypt");
        let other = TokenCipher::new(&[2u8; 32]).expect("cipher");
        assert!(other.decrypt(&sealed, "row").is_err());
        assert!(other.decrypt("AAAA", "row").is_err());
    }

    #[test]
    fn test_generated_key_decodes_to_32_bytes() {
        let key = generate_encryption_key().expect("key");
        let bytes = general_purpose::STANDARD.decode(key).expect("base64");
        assert_eq!(bytes.len(), 32);
    }
}
