//! Domain-separated key derivation and shielded-address text encoding.
//!
//! All four keys derive from a 32-byte seed owned exclusively by the
//! wallet; `spending_key`, `viewing_key` and `nullifier_key` are handed to
//! other components read-only. The shielded address is displayed
//! Base58-encoded using the Bitcoin alphabet.

use sha2::{Digest, Sha256};

use crate::error::KeyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingKeys {
    pub seed: [u8; 32],
    pub spending_key: [u8; 32],
    pub viewing_key: [u8; 32],
    pub nullifier_key: [u8; 32],
    pub shielded_address: [u8; 32],
}

fn domain_hash(domain: &'static str, payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update(payload);
    hasher.finalize().into()
}

/// Derive the full keyset from a 32-byte seed.
pub fn derive_keys(seed: [u8; 32]) -> SpendingKeys {
    let spending_key = domain_hash("spending", &seed);
    let viewing_key = domain_hash("viewing", &seed);
    let nullifier_key = domain_hash("nullifier", &seed);
    let shielded_address = domain_hash("address", &spending_key);

    SpendingKeys {
        seed,
        spending_key,
        viewing_key,
        nullifier_key,
        shielded_address,
    }
}

/// Base58-encode (Bitcoin alphabet) a shielded address for display.
pub fn encode_address(address: &[u8; 32]) -> String {
    bs58::encode(address).into_string()
}

/// Decode a Base58 string back into a fixed-size key. Rejects characters
/// outside the Bitcoin alphabet and rejects empty input (an open question
/// in the original implementation, resolved here by refusing rather than
/// returning a zero-padded buffer).
pub fn decode_address(s: &str) -> Result<[u8; 32], KeyError> {
    if s.is_empty() {
        return Err(KeyError::EmptyInput);
    }
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|_| KeyError::InvalidBase58Char)?;
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    Ok(out)
}
