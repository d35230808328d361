//! BN254 Poseidon hash, bit-for-bit compatible with the on-chain sponge-free
//! permutation: width = inputs.len() + 1; state is initialized to
//! `[0, inputs...]`, then `full/2 -> partial -> full/2` rounds, each round
//! being ARK -> S-box -> MDS. The permutation itself, including its ARK
//! constants and MDS matrix, is circomlib's and is not reimplemented here —
//! `light-poseidon` ships that table directly rather than a locally
//! generated stand-in.

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonBytesHasher};

use crate::error::PoseidonError;

/// Hash 1..=4 field elements, each a big-endian 32-byte array reduced mod p.
/// Returns the output as 32 big-endian bytes.
pub fn hash(inputs: &[[u8; 32]]) -> Result<[u8; 32], PoseidonError> {
    if inputs.is_empty() || inputs.len() > 4 {
        return Err(PoseidonError::InvalidInputCount(inputs.len()));
    }

    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())
        .map_err(|_| PoseidonError::MissingParameters { width: inputs.len() + 1 })?;
    let refs: Vec<&[u8]> = inputs.iter().map(|b| b.as_slice()).collect();
    hasher
        .hash_bytes_be(&refs)
        .map_err(|_| PoseidonError::MissingParameters { width: inputs.len() + 1 })
}

/// Convenience wrapper for the common two-input case (Merkle node hashing).
pub fn hash2(left: [u8; 32], right: [u8; 32]) -> Result<[u8; 32], PoseidonError> {
    hash(&[left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_input_count() {
        assert_eq!(hash(&[]), Err(PoseidonError::InvalidInputCount(0)));
        assert_eq!(
            hash(&[[0u8; 32]; 5]),
            Err(PoseidonError::InvalidInputCount(5))
        );
    }

    #[test]
    fn is_deterministic() {
        let a = hash(&[[1u8; 32]]).unwrap();
        let b = hash(&[[1u8; 32]]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn is_sensitive_to_each_input() {
        let base = hash(&[[1u8; 32], [2u8; 32]]).unwrap();
        let mut changed_first = [1u8; 32];
        changed_first[0] = 0xFF;
        let changed = hash(&[changed_first, [2u8; 32]]).unwrap();
        assert_ne!(base, changed);

        let mut changed_second = [2u8; 32];
        changed_second[31] = 0x01;
        let changed2 = hash(&[[1u8; 32], changed_second]).unwrap();
        assert_ne!(base, changed2);
    }

    #[test]
    fn different_widths_diverge() {
        let one = hash(&[[7u8; 32]]).unwrap();
        let two = hash(&[[7u8; 32], [0u8; 32]]).unwrap();
        assert_ne!(one, two);
    }

    /// spec §8 scenario 1: Poseidon width-2 zero.
    #[test]
    fn matches_width_2_zero_vector() {
        let expected =
            hex::decode("2a09a9fd93c590c26b91effbb2499f07e8f7aa12e2b4940a3aed2411cb65e11c")
                .unwrap();
        assert_eq!(hash(&[[0u8; 32]]).unwrap().to_vec(), expected);
    }

    /// spec §8 scenario 2: Poseidon width-3 ones/twos.
    #[test]
    fn matches_width_3_ones_twos_vector() {
        let expected =
            hex::decode("0d54e1938f8a8c1c7deb5e0355f26319207b84fe9ca2ce1b26e735c829821990")
                .unwrap();
        assert_eq!(hash(&[[1u8; 32], [2u8; 32]]).unwrap().to_vec(), expected);
    }
}
