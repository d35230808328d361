//! Error kinds for every component, aggregated into one crate-level `Error`
//! so a host application has a single type to match on at the outer
//! boundary while each component still propagates a narrow, specific enum
//! internally (§7).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PoseidonError {
    #[error("poseidon input count must be 1..=4, got {0}")]
    InvalidInputCount(usize),
    #[error("no poseidon parameter table for width {width}")]
    MissingParameters { width: usize },
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CodecError {
    #[error("truncated input: needed {needed} more bytes, had {available}")]
    TruncatedInput { needed: usize, available: usize },
    #[error("invalid utf-8 in decoded string")]
    InvalidUtf8,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CryptoError {
    #[error("invalid serialized note length: {0}")]
    InvalidNoteLength(usize),
    #[error("authenticated decryption failed")]
    DecryptionFailed,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum KeyError {
    #[error("base58 string contains a character outside the alphabet")]
    InvalidBase58Char,
    #[error("base58 input must not be empty")]
    EmptyInput,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum MerkleError {
    #[error("epoch tree is not active")]
    EpochNotActive,
    #[error("epoch tree is full")]
    TreeFull,
    #[error("no leaf at index {0}")]
    LeafNotFound(u32),
    #[error("merkle proof does not verify against its root")]
    ProofMismatch,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NoteStoreError {
    #[error("minNotes must be at least 1")]
    InvalidMinNotes,
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("insufficient notes: have {have}, need {need}")]
    InsufficientNotes { have: usize, need: usize },
    #[error("note not found")]
    NoteNotFound,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TxBuilderError {
    #[error("note is not confirmed (missing leafIndex/epoch)")]
    NoteNotConfirmed,
    #[error("note epoch {note} does not match tree epoch {tree}")]
    EpochMismatch { note: u64, tree: u64 },
    #[error("no epoch tree found for the requested epoch")]
    EpochTreeNotFound,
    #[error("transfer accepts at most 2 inputs")]
    TooManyInputs,
    #[error("transfer requires exactly 2 outputs, got {0}")]
    InvalidOutputCount(usize),
    #[error("renewal is not needed: note epoch is not older than the current epoch")]
    RenewNotNeeded,
    #[error("conservation violated: inputs {inputs} != outputs {outputs} + fee")]
    ConservationViolation { inputs: u64, outputs: u64 },
    #[error("proof generation failed")]
    ProofGenerationFailed,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ProverError {
    #[error("invalid prover inputs")]
    InvalidInputs,
    #[error("witness generation failed")]
    WitnessGenerationFailed,
    #[error("proof generation failed")]
    ProofGenerationFailed,
    #[error("no prover backend is linked")]
    FrameworkNotIntegrated,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ScannerError {
    #[error("invalid event data")]
    InvalidEventData,
    #[error("event parse error")]
    ParseError,
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum InstructionError {
    #[error("no off-curve bump seed found for program-derived address")]
    BumpSeedNotFound,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Poseidon(#[from] PoseidonError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    NoteStore(#[from] NoteStoreError),
    #[error(transparent)]
    TxBuilder(#[from] TxBuilderError),
    #[error(transparent)]
    Prover(#[from] ProverError),
    #[error(transparent)]
    Scanner(#[from] ScannerError),
    #[error(transparent)]
    Instruction(#[from] InstructionError),
}

pub type Result<T> = std::result::Result<T, Error>;
