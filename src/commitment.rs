//! Note commitment and nullifier derivation (§4.4).
//!
//! The endianness asymmetry here is intentional and dictated by the
//! circuit: `value` goes into Poseidon as 32 big-endian bytes, while
//! `epoch`/`leafIndex` go in as 32 little-endian bytes. Do not "fix" this.

use crate::poseidon;

fn u64_be32(v: u64) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[24..].copy_from_slice(&v.to_be_bytes());
    buf
}

fn u64_le32(v: u64) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[..8].copy_from_slice(&v.to_le_bytes());
    buf
}

/// `commitment = H(value_be32, owner, randomness)`.
pub fn commitment(value: u64, owner: &[u8; 32], randomness: &[u8; 32]) -> [u8; 32] {
    poseidon::hash(&[u64_be32(value), *owner, *randomness])
        .expect("width 4 is a supported poseidon width")
}

/// `nullifier = H(commitment, nullifierKey, epoch_le32, leafIndex_le32)`.
pub fn nullifier(
    commitment: &[u8; 32],
    nullifier_key: &[u8; 32],
    epoch: u64,
    leaf_index: u32,
) -> [u8; 32] {
    poseidon::hash(&[
        *commitment,
        *nullifier_key,
        u64_le32(epoch),
        u64_le32(leaf_index as u64),
    ])
    .expect("width 5 is a supported poseidon width")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_is_deterministic() {
        let owner = [1u8; 32];
        let rand = [2u8; 32];
        assert_eq!(commitment(100, &owner, &rand), commitment(100, &owner, &rand));
    }

    #[test]
    fn commitment_is_sensitive_to_each_field() {
        let owner = [1u8; 32];
        let rand = [2u8; 32];
        let base = commitment(100, &owner, &rand);

        assert_ne!(base, commitment(101, &owner, &rand));
        let mut other_owner = owner;
        other_owner[0] ^= 1;
        assert_ne!(base, commitment(100, &other_owner, &rand));
        let mut other_rand = rand;
        other_rand[0] ^= 1;
        assert_ne!(base, commitment(100, &owner, &other_rand));
    }

    #[test]
    fn nullifier_is_sensitive_to_each_field() {
        let c = [3u8; 32];
        let nk = [4u8; 32];
        let base = nullifier(&c, &nk, 5, 6);

        let mut other_c = c;
        other_c[0] ^= 1;
        assert_ne!(base, nullifier(&other_c, &nk, 5, 6));

        let mut other_nk = nk;
        other_nk[0] ^= 1;
        assert_ne!(base, nullifier(&c, &other_nk, 5, 6));

        assert_ne!(base, nullifier(&c, &nk, 7, 6));
        assert_ne!(base, nullifier(&c, &nk, 5, 7));
    }

    #[test]
    fn value_and_epoch_encodings_place_bytes_on_opposite_ends() {
        let be = u64_be32(1);
        let le = u64_le32(1);
        assert_eq!(be[31], 1);
        assert_eq!(le[0], 1);
        assert_ne!(be, le);
    }
}
