//! ChaCha20-Poly1305 note sealing with a 12-byte nonce.
//!
//! Ciphertext layout used throughout the SDK is `nonce(12) || ciphertext ||
//! tag(16)`, matching §4.9's `encryptedNote` format; `seal`/`open` work on
//! that combined blob so callers never have to juggle the pieces.

use aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};

use crate::error::CryptoError;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .expect("chacha20poly1305 encryption cannot fail for in-memory buffers");
    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    out
}

/// Split the leading 12-byte nonce off `blob` and attempt authenticated
/// decryption. Returns `None` on any failure — wrong key, wrong nonce, or a
/// blob too short to contain a nonce — never an error, since a failed open
/// is the expected outcome for events that are not ours (§4.8).
pub fn open(key: &[u8; 32], blob: &[u8]) -> Option<Vec<u8>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return None;
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).ok()
}

/// Same as `open` but surfaces the failure as `CryptoError` for callers
/// that know the blob is theirs and want a hard error on corruption.
pub fn open_strict(key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    open(key, blob).ok_or(CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let key = [1u8; 32];
        let msg = b"a shielded note payload";
        let blob = seal(&key, msg);
        assert_eq!(open(&key, &blob).unwrap(), msg);
    }

    #[test]
    fn wrong_key_fails() {
        let key = [1u8; 32];
        let other = [2u8; 32];
        let blob = seal(&key, b"secret");
        assert_eq!(open(&other, &blob), None);
    }

    #[test]
    fn corrupted_nonce_fails() {
        let key = [1u8; 32];
        let mut blob = seal(&key, b"secret");
        blob[0] ^= 0xFF;
        assert_eq!(open(&key, &blob), None);
    }
}
