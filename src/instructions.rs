//! On-chain instruction encoding (§6.2).
//!
//! Every instruction is `discriminator(8) || args`, integers little-endian
//! and every length prefix a u32 — the same convention the event log
//! uses. Discriminators are fixed constants supplied by the program and
//! are opaque to this crate; they are not derived here, only reproduced.
//!
//! The withdraw struct's field order (root, amount, nullifier, ...)
//! intentionally does not match the prose order a first reading of the
//! wire layout suggests — it is fixed so the serialized nullifier lands
//! at the byte range an external verifier expects. Do not reorder it to
//! "look right".

use crate::codec::{Decoder, Encoder};
use crate::error::CodecError;

pub const INITIALIZE_POOL_V2: [u8; 8] = [0xcf, 0x2d, 0x57, 0xf2, 0x1b, 0x3f, 0xcc, 0x43];
pub const INITIALIZE_EPOCH_LEAF_CHUNK: [u8; 8] = [0x80, 0xb5, 0xe0, 0xa7, 0xbd, 0xc3, 0xa1, 0xd3];
pub const DEPOSIT_V2: [u8; 8] = [0x6d, 0x4b, 0x45, 0x99, 0xac, 0xda, 0x92, 0x13];
pub const WITHDRAW_V2: [u8; 8] = [0xf2, 0x50, 0xa3, 0x00, 0xc4, 0xdd, 0xc2, 0xc2];
pub const TRANSFER_V2: [u8; 8] = [0x77, 0x28, 0x06, 0xeb, 0xea, 0xdd, 0xf8, 0x31];
pub const RENEW_NOTE: [u8; 8] = [0xcf, 0xfe, 0x07, 0x63, 0xcc, 0x44, 0xa3, 0xab];
pub const ROLLOVER_EPOCH: [u8; 8] = [0xb2, 0x0c, 0x6a, 0xe9, 0x7d, 0x37, 0x3a, 0x6f];
pub const FINALIZE_EPOCH: [u8; 8] = [0x9f, 0x5d, 0x75, 0xd9, 0x3f, 0x2c, 0xf9, 0x4c];

/// Fixed public-input struct for `withdrawV2`, serialized directly after
/// the length-prefixed proof bytes. 176 bytes: 5×32 + 2×8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawPublicInputs {
    pub root: [u8; 32],
    pub amount: u64,
    pub nullifier: [u8; 32],
    pub recipient: [u8; 32],
    pub epoch: u64,
    pub tx_anchor: [u8; 32],
    pub pool_id: [u8; 32],
}

/// Fixed public-input struct for `transferV2`: 5×32 + u64 + 2×32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPublicInputs {
    pub nullifier_a: [u8; 32],
    pub nullifier_b: [u8; 32],
    pub merkle_root: [u8; 32],
    pub output_commitment_a: [u8; 32],
    pub output_commitment_b: [u8; 32],
    pub output_epoch: u64,
    pub tx_anchor: [u8; 32],
    pub pool_id: [u8; 32],
}

/// Fixed public-input struct for `renewNote`: 3×32 + 2×8 + 2×32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewPublicInputs {
    pub old_commitment: [u8; 32],
    pub old_nullifier: [u8; 32],
    pub new_commitment: [u8; 32],
    pub source_epoch: u64,
    pub target_epoch: u64,
    pub tx_anchor: [u8; 32],
    pub pool_id: [u8; 32],
}

pub fn encode_deposit_v2(commitment: &[u8; 32], amount: u64, encrypted_note: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&DEPOSIT_V2)
        .fixed_bytes(commitment)
        .u64(amount)
        .bytes_with_len(encrypted_note);
    enc.into_bytes()
}

pub fn encode_withdraw_v2(proof: &[u8], inputs: &WithdrawPublicInputs) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&WITHDRAW_V2).bytes_with_len(proof);
    enc.fixed_bytes(&inputs.root)
        .u64(inputs.amount)
        .fixed_bytes(&inputs.nullifier)
        .fixed_bytes(&inputs.recipient)
        .u64(inputs.epoch)
        .fixed_bytes(&inputs.tx_anchor)
        .fixed_bytes(&inputs.pool_id);
    enc.into_bytes()
}

pub fn encode_transfer_v2(
    proof: &[u8],
    inputs: &TransferPublicInputs,
    encrypted_notes: &[Vec<u8>],
) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&TRANSFER_V2).bytes_with_len(proof);
    enc.fixed_bytes(&inputs.nullifier_a)
        .fixed_bytes(&inputs.nullifier_b)
        .fixed_bytes(&inputs.merkle_root)
        .fixed_bytes(&inputs.output_commitment_a)
        .fixed_bytes(&inputs.output_commitment_b)
        .u64(inputs.output_epoch)
        .fixed_bytes(&inputs.tx_anchor)
        .fixed_bytes(&inputs.pool_id);
    enc.var_vec(encrypted_notes, |e, note| {
        e.bytes_with_len(note);
    });
    enc.into_bytes()
}

pub fn encode_renew_note(proof: &[u8], inputs: &RenewPublicInputs, encrypted_note: &[u8]) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&RENEW_NOTE).bytes_with_len(proof);
    enc.fixed_bytes(&inputs.old_commitment)
        .fixed_bytes(&inputs.old_nullifier)
        .fixed_bytes(&inputs.new_commitment)
        .u64(inputs.source_epoch)
        .u64(inputs.target_epoch)
        .fixed_bytes(&inputs.tx_anchor)
        .fixed_bytes(&inputs.pool_id)
        .bytes_with_len(encrypted_note);
    enc.into_bytes()
}

pub fn encode_initialize_pool_v2(
    epoch_duration_slots: u64,
    expiry_slots: u64,
    finalization_delay_slots: u64,
) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&INITIALIZE_POOL_V2)
        .u64(epoch_duration_slots)
        .u64(expiry_slots)
        .u64(finalization_delay_slots);
    enc.into_bytes()
}

pub fn encode_initialize_epoch_leaf_chunk(epoch: u64, chunk_index: u32) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&INITIALIZE_EPOCH_LEAF_CHUNK)
        .u64(epoch)
        .u32(chunk_index);
    enc.into_bytes()
}

pub fn encode_finalize_epoch(epoch: u64) -> Vec<u8> {
    let mut enc = Encoder::new();
    enc.fixed_bytes(&FINALIZE_EPOCH).u64(epoch);
    enc.into_bytes()
}

pub fn decode_withdraw_v2(bytes: &[u8]) -> Result<(Vec<u8>, WithdrawPublicInputs), CodecError> {
    let mut dec = Decoder::new(&bytes[8..]);
    let proof = dec.bytes_with_len()?.to_vec();
    let inputs = WithdrawPublicInputs {
        root: dec.fixed_array()?,
        amount: dec.u64()?,
        nullifier: dec.fixed_array()?,
        recipient: dec.fixed_array()?,
        epoch: dec.u64()?,
        tx_anchor: dec.fixed_array()?,
        pool_id: dec.fixed_array()?,
    };
    Ok((proof, inputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_withdraw_inputs() -> WithdrawPublicInputs {
        WithdrawPublicInputs {
            root: [1u8; 32],
            amount: 1_000,
            nullifier: [2u8; 32],
            recipient: [3u8; 32],
            epoch: 7,
            tx_anchor: [4u8; 32],
            pool_id: [5u8; 32],
        }
    }

    #[test]
    fn withdraw_layout_matches_spec_scenario() {
        let proof = vec![0u8; 256];
        let inputs = sample_withdraw_inputs();
        let bytes = encode_withdraw_v2(&proof, &inputs);

        assert_eq!(bytes.len(), 8 + 4 + 256 + 176);
        assert_eq!(&bytes[0..8], &WITHDRAW_V2);
        assert_eq!(&bytes[12..268], proof.as_slice());
        assert_eq!(&bytes[308..340], &inputs.nullifier);
    }

    #[test]
    fn withdraw_round_trips() {
        let proof = vec![9u8; 64];
        let inputs = sample_withdraw_inputs();
        let bytes = encode_withdraw_v2(&proof, &inputs);

        let (decoded_proof, decoded_inputs) = decode_withdraw_v2(&bytes).unwrap();
        assert_eq!(decoded_proof, proof);
        assert_eq!(decoded_inputs, inputs);
    }

    #[test]
    fn deposit_round_trips() {
        let commitment = [7u8; 32];
        let note = vec![1, 2, 3, 4];
        let bytes = encode_deposit_v2(&commitment, 500, &note);

        let mut dec = Decoder::new(&bytes[8..]);
        assert_eq!(dec.fixed_array::<32>().unwrap(), commitment);
        assert_eq!(dec.u64().unwrap(), 500);
        assert_eq!(dec.bytes_with_len().unwrap(), note.as_slice());
    }

    #[test]
    fn finalize_epoch_is_disc_plus_u64() {
        let bytes = encode_finalize_epoch(42);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..8], &FINALIZE_EPOCH);
        assert_eq!(u64::from_le_bytes(bytes[8..16].try_into().unwrap()), 42);
    }
}
