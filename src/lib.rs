//! Client-side SDK for a privacy-preserving, epoch-based shielded pool:
//! Poseidon commitments and nullifiers over BN254, an epoch-partitioned
//! Merkle tree, note lifecycle management, event scanning and
//! transaction preparation. No network or on-chain execution lives
//! here — this crate produces bytes and witnesses; submission is the
//! host application's job.

pub mod aead;
pub mod codec;
pub mod commitment;
pub mod config;
pub mod error;
pub mod events;
pub mod field;
pub mod instructions;
pub mod keys;
pub mod merkle;
pub mod note;
pub mod pda;
pub mod poseidon;
pub mod prover;
pub mod scanner;
pub mod tx_builder;

pub use config::PoolConfig;
pub use error::{Error, Result};
pub use keys::{decode_address, derive_keys, encode_address, SpendingKeys};
pub use merkle::{EpochState, EpochTree, MerkleProof};
pub use note::{BalanceSummary, Note, NoteStore};
pub use prover::{Groth16Proof, NullProver, Prover};
pub use scanner::{ScanKeys, Scanner};
