//! Program-derived addresses (§4.10).
//!
//! A PDA is found by hashing seeds plus a bump byte with the program id
//! until the result decodes as a point *not* on the ed25519 curve —
//! the standard `findProgramAddress` bump-grinding search, walked from
//! bump 255 down to 0 so the result is deterministic and reproducible
//! off-chain.
//!
//! `poolConfig` is the only PDA seeded from the raw mint; every other
//! address is seeded from `poolConfig`'s own derived address, so callers
//! must derive `poolConfig` first and feed its address into the rest.

use curve25519_dalek::edwards::CompressedEdwardsY;
use sha2::{Digest, Sha256};

use crate::error::InstructionError;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

fn hash_seeds(seeds: &[&[u8]], bump: u8, program_id: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

fn is_off_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_none()
}

/// Search bumps 255 down to 0 for the first off-curve address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), InstructionError> {
    for bump in (0..=255u8).rev() {
        let candidate = hash_seeds(seeds, bump, program_id);
        if is_off_curve(&candidate) {
            return Ok((candidate, bump));
        }
    }
    Err(InstructionError::BumpSeedNotFound)
}

pub fn chunk_index(leaf_index: u32) -> u32 {
    leaf_index / 256
}

pub fn pool_config_seeds(mint: &[u8; 32]) -> Vec<Vec<u8>> {
    vec![b"pool_config".to_vec(), mint.to_vec()]
}

/// Convenience for the first derivation step every other PDA depends on.
pub fn derive_pool_config(
    mint: &[u8; 32],
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), InstructionError> {
    derive(&pool_config_seeds(mint), program_id)
}

pub fn epoch_tree_seeds(pool_config: &[u8; 32], epoch: u64) -> Vec<Vec<u8>> {
    vec![
        b"epoch_tree".to_vec(),
        pool_config.to_vec(),
        epoch.to_le_bytes().to_vec(),
    ]
}

pub fn leaf_chunk_seeds(pool_config: &[u8; 32], epoch: u64, leaf_index: u32) -> Vec<Vec<u8>> {
    vec![
        b"leaves".to_vec(),
        pool_config.to_vec(),
        epoch.to_le_bytes().to_vec(),
        chunk_index(leaf_index).to_le_bytes().to_vec(),
    ]
}

pub fn vault_authority_seeds(pool_config: &[u8; 32]) -> Vec<Vec<u8>> {
    vec![b"vault_authority".to_vec(), pool_config.to_vec()]
}

pub fn vault_seeds(pool_config: &[u8; 32]) -> Vec<Vec<u8>> {
    vec![b"vault".to_vec(), pool_config.to_vec()]
}

pub fn nullifier_marker_seeds(pool_config: &[u8; 32], nullifier: &[u8; 32]) -> Vec<Vec<u8>> {
    vec![
        b"nullifier".to_vec(),
        pool_config.to_vec(),
        nullifier.to_vec(),
    ]
}

pub fn verifier_config_seeds(pool_config: &[u8; 32], circuit_name: &str) -> Vec<Vec<u8>> {
    vec![
        b"verifier".to_vec(),
        pool_config.to_vec(),
        circuit_name.as_bytes().to_vec(),
    ]
}

fn seed_refs(seeds: &[Vec<u8>]) -> Vec<&[u8]> {
    seeds.iter().map(|s| s.as_slice()).collect()
}

pub fn derive(seeds: &[Vec<u8>], program_id: &[u8; 32]) -> Result<([u8; 32], u8), InstructionError> {
    let refs = seed_refs(seeds);
    find_program_address(&refs, program_id)
}
