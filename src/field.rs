//! BN254 scalar field helpers shared by Poseidon and commitment derivation.
//!
//! Every field element that crosses a component boundary is represented as
//! `[u8; 32]`. Poseidon inputs are big-endian; the wire formats in §6 embed
//! small integers little-endian. This module only deals with the former —
//! little-endian u256 embedding lives next to the callers that need it
//! (commitment.rs, events.rs) so the endianness choice stays visible at the
//! call site instead of being hidden behind a generic helper.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

/// Reduce a big-endian 32-byte string mod p and return the field element.
pub fn fr_from_be_bytes(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Encode a field element as 32 big-endian bytes, zero-padded on the left.
pub fn fr_to_be_bytes(fr: &Fr) -> [u8; 32] {
    let be = fr.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    // BigInteger::to_bytes_be is limb-width (32 bytes for BN254's Fr) and
    // already left-padded with zeros, but pad defensively in case that
    // limb width ever changes under us.
    let offset = out.len().saturating_sub(be.len());
    let be_start = be.len().saturating_sub(out.len() - offset);
    out[offset..].copy_from_slice(&be[be_start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_field() {
        let bytes = [0xAB; 32];
        let fr = fr_from_be_bytes(&bytes);
        let back = fr_to_be_bytes(&fr);
        assert_eq!(back, bytes);
    }

    #[test]
    fn reduces_modulo_p() {
        // p itself must reduce to the zero element.
        let p_hex = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";
        let p_bytes: [u8; 32] = hex::decode(p_hex).unwrap().try_into().unwrap();
        let fr = fr_from_be_bytes(&p_bytes);
        assert_eq!(fr_to_be_bytes(&fr), [0u8; 32]);
    }
}
