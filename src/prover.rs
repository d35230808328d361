//! Proof generation boundary (§4.9, §5).
//!
//! `Prover` is an `async` capability: witness/proof generation is the one
//! real suspension point in an otherwise single-threaded SDK, so it is
//! modeled as a trait rather than a plain function, the same way the
//! teacher kept its heavy zk-proving calls behind `async fn` boundaries.
//! No backend is linked by default — [`NullProver`] always returns
//! [`ProverError::FrameworkNotIntegrated`], which callers treat as a
//! configuration error rather than a witness failure.

use async_trait::async_trait;

use crate::error::ProverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: [u8; 64],
    pub b: [u8; 128],
    pub c: [u8; 64],
}

#[derive(Debug, Clone)]
pub struct WithdrawInputs {
    pub commitment: [u8; 32],
    pub nullifier: [u8; 32],
    pub merkle_root: [u8; 32],
    pub merkle_siblings: Vec<[u8; 32]>,
    pub leaf_index: u32,
    pub value: u64,
    pub owner: [u8; 32],
    pub randomness: [u8; 32],
    pub spending_key: [u8; 32],
    pub recipient: [u8; 32],
    pub fee: u64,
}

#[derive(Debug, Clone)]
pub struct TransferInputs {
    pub input_commitments: Vec<[u8; 32]>,
    pub input_nullifiers: Vec<[u8; 32]>,
    pub input_merkle_roots: Vec<[u8; 32]>,
    pub input_merkle_siblings: Vec<Vec<[u8; 32]>>,
    pub input_leaf_indices: Vec<u32>,
    pub input_values: Vec<u64>,
    pub input_randomness: Vec<[u8; 32]>,
    pub spending_key: [u8; 32],
    pub output_commitments: Vec<[u8; 32]>,
    pub output_values: Vec<u64>,
    pub output_owners: Vec<[u8; 32]>,
    pub output_randomness: Vec<[u8; 32]>,
    pub fee: u64,
}

#[derive(Debug, Clone)]
pub struct RenewInputs {
    pub old_commitment: [u8; 32],
    pub old_nullifier: [u8; 32],
    pub merkle_root: [u8; 32],
    pub merkle_siblings: Vec<[u8; 32]>,
    pub leaf_index: u32,
    pub value: u64,
    pub owner: [u8; 32],
    pub old_randomness: [u8; 32],
    pub new_randomness: [u8; 32],
    pub new_commitment: [u8; 32],
    pub spending_key: [u8; 32],
}

#[async_trait]
pub trait Prover {
    async fn prove_withdraw(&self, inputs: WithdrawInputs) -> Result<Groth16Proof, ProverError>;
    async fn prove_transfer(&self, inputs: TransferInputs) -> Result<Groth16Proof, ProverError>;
    async fn prove_renew(&self, inputs: RenewInputs) -> Result<Groth16Proof, ProverError>;
}

/// Default prover: no circuit backend is linked into the SDK. Every call
/// fails with `FrameworkNotIntegrated` so callers can distinguish "no
/// prover configured" from "the witness was malformed".
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProver;

#[async_trait]
impl Prover for NullProver {
    async fn prove_withdraw(&self, _inputs: WithdrawInputs) -> Result<Groth16Proof, ProverError> {
        Err(ProverError::FrameworkNotIntegrated)
    }

    async fn prove_transfer(&self, _inputs: TransferInputs) -> Result<Groth16Proof, ProverError> {
        Err(ProverError::FrameworkNotIntegrated)
    }

    async fn prove_renew(&self, _inputs: RenewInputs) -> Result<Groth16Proof, ProverError> {
        Err(ProverError::FrameworkNotIntegrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_prover_reports_missing_framework() {
        let prover = NullProver;
        let inputs = WithdrawInputs {
            commitment: [0u8; 32],
            nullifier: [0u8; 32],
            merkle_root: [0u8; 32],
            merkle_siblings: vec![],
            leaf_index: 0,
            value: 0,
            owner: [0u8; 32],
            randomness: [0u8; 32],
            spending_key: [0u8; 32],
            recipient: [0u8; 32],
            fee: 0,
        };
        assert_eq!(
            prover.prove_withdraw(inputs).await,
            Err(ProverError::FrameworkNotIntegrated)
        );
    }
}
