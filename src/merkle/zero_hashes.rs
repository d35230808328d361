//! Zero-hash constants for the depth-12 epoch Merkle tree.
//!
//! `z[0] = 0`; `z[i] = Poseidon(z[i-1], z[i-1])`. `z[12]` is the empty-tree
//! root and must match the on-chain constant. Computed once and cached —
//! these are process-scoped read-only singletons, not locked structures
//! (§9).

use once_cell::sync::Lazy;

use crate::merkle::DEPTH;
use crate::poseidon;

pub static ZERO_HASHES: Lazy<[[u8; 32]; DEPTH + 1]> = Lazy::new(|| {
    let mut z = [[0u8; 32]; DEPTH + 1];
    for level in 1..=DEPTH {
        z[level] = poseidon::hash2(z[level - 1], z[level - 1])
            .expect("width 3 poseidon is always available");
    }
    z
});
