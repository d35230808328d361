//! Transaction builders: deposit, withdraw, transfer, renew (§4.9).
//!
//! Each builder assembles the witness for its prover call, enforces value
//! conservation before ever invoking the prover, and returns a prepared
//! transaction the caller still needs to submit on-chain via
//! [`crate::instructions`]. Mirrors the teacher's pattern of keeping proof
//! generation and conservation checks in the same layer rather than
//! splitting them across a client and a verifier.

use crate::commitment;
use crate::error::TxBuilderError;
use crate::merkle::EpochTree;
use crate::note::Note;
use crate::prover::{Groth16Proof, Prover, RenewInputs, TransferInputs, WithdrawInputs};

/// A note being spent, or a zero-value dummy padding a transfer's input
/// slots up to its fixed arity — a first-class variant rather than a
/// note with `value == 0` smuggled through the normal path.
#[derive(Debug, Clone)]
pub enum NoteInput {
    Real(Note),
    Dummy,
}

impl NoteInput {
    fn value(&self) -> u64 {
        match self {
            NoteInput::Real(n) => n.value,
            NoteInput::Dummy => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreparedDeposit {
    pub commitment: [u8; 32],
    pub encrypted_note: Vec<u8>,
    pub value: u64,
}

#[derive(Debug, Clone)]
pub struct PreparedWithdraw {
    pub nullifier: [u8; 32],
    pub merkle_root: [u8; 32],
    pub amount: u64,
    pub fee: u64,
    pub recipient: [u8; 32],
    pub proof: Groth16Proof,
}

#[derive(Debug, Clone)]
pub struct PreparedTransfer {
    pub nullifiers: Vec<[u8; 32]>,
    pub output_commitments: Vec<[u8; 32]>,
    pub encrypted_outputs: Vec<Vec<u8>>,
    pub fee: u64,
    pub proof: Groth16Proof,
}

#[derive(Debug, Clone)]
pub struct PreparedRenew {
    pub old_nullifier: [u8; 32],
    pub new_commitment: [u8; 32],
    pub encrypted_note: Vec<u8>,
    pub proof: Groth16Proof,
}

fn require_confirmed(note: &Note) -> Result<(u32, u64), TxBuilderError> {
    match (note.leaf_index, note.epoch) {
        (Some(l), Some(e)) => Ok((l, e)),
        _ => Err(TxBuilderError::NoteNotConfirmed),
    }
}

/// Deposit: no inputs, one fresh output, nothing to prove — the pool
/// accepts the commitment on faith and the viewing key is what lets the
/// owner recover it later.
pub fn build_deposit(
    value: u64,
    owner: [u8; 32],
    randomness: [u8; 32],
    token: [u8; 32],
    viewing_key: &[u8; 32],
) -> PreparedDeposit {
    let commitment = commitment::commitment(value, &owner, &randomness);
    let mut plaintext = Vec::with_capacity(72);
    plaintext.extend_from_slice(&value.to_le_bytes());
    plaintext.extend_from_slice(&token);
    plaintext.extend_from_slice(&randomness);
    let encrypted_note = crate::aead::seal(viewing_key, &plaintext);
    PreparedDeposit {
        commitment,
        encrypted_note,
        value,
    }
}

pub async fn build_withdraw<P: Prover + ?Sized>(
    prover: &P,
    note: &Note,
    tree: &EpochTree,
    spending_key: [u8; 32],
    nullifier_key: [u8; 32],
    recipient: [u8; 32],
    fee: u64,
) -> Result<PreparedWithdraw, TxBuilderError> {
    let (leaf_index, epoch) = require_confirmed(note)?;
    if epoch != tree.epoch {
        return Err(TxBuilderError::EpochMismatch {
            note: epoch,
            tree: tree.epoch,
        });
    }
    let proof_data = tree
        .proof(leaf_index)
        .map_err(|_| TxBuilderError::EpochTreeNotFound)?;

    let nullifier = commitment::nullifier(&note.commitment, &nullifier_key, epoch, leaf_index);
    if note.value < fee {
        return Err(TxBuilderError::ConservationViolation {
            inputs: note.value,
            outputs: 0,
        });
    }

    let proof = prover
        .prove_withdraw(WithdrawInputs {
            commitment: note.commitment,
            nullifier,
            merkle_root: proof_data.root,
            merkle_siblings: proof_data.siblings,
            leaf_index,
            value: note.value,
            owner: note.owner,
            randomness: note.randomness,
            spending_key,
            recipient,
            fee,
        })
        .await
        .map_err(|_| TxBuilderError::ProofGenerationFailed)?;

    Ok(PreparedWithdraw {
        nullifier,
        merkle_root: proof_data.root,
        amount: note.value - fee,
        fee,
        recipient,
        proof,
    })
}

/// Transfer is fixed 2-in/2-out: fewer than two inputs are padded with
/// `NoteInput::Dummy`, and exactly two outputs are required (the builder
/// has no dummy-output equivalent since an output's owner/value are
/// caller-supplied, not derivable). Conservation (`Σ inputs = Σ outputs +
/// fee`) is checked before ever calling the prover.
pub async fn build_transfer<P: Prover + ?Sized>(
    prover: &P,
    inputs: &[NoteInput],
    trees: &[&EpochTree],
    spending_key: [u8; 32],
    nullifier_key: [u8; 32],
    outputs: &[(u64, [u8; 32])], // (value, owner)
    output_randomness: &[[u8; 32]],
    viewing_keys: &[[u8; 32]],
    fee: u64,
) -> Result<(PreparedTransfer, Vec<[u8; 32]>), TxBuilderError> {
    if inputs.len() > 2 {
        return Err(TxBuilderError::TooManyInputs);
    }
    if outputs.len() != 2 {
        return Err(TxBuilderError::InvalidOutputCount(outputs.len()));
    }

    let mut padded_inputs: Vec<NoteInput> = inputs.to_vec();
    while padded_inputs.len() < 2 {
        padded_inputs.push(NoteInput::Dummy);
    }

    let total_in: u64 = padded_inputs.iter().map(|i| i.value()).sum();
    let total_out: u64 = outputs.iter().map(|(v, _)| v).sum();
    if total_in != total_out + fee {
        return Err(TxBuilderError::ConservationViolation {
            inputs: total_in,
            outputs: total_out,
        });
    }

    let mut input_commitments = Vec::new();
    let mut input_nullifiers = Vec::new();
    let mut input_merkle_roots = Vec::new();
    let mut input_merkle_siblings = Vec::new();
    let mut input_leaf_indices = Vec::new();
    let mut input_values = Vec::new();
    let mut input_randomness = Vec::new();

    for (i, input) in padded_inputs.iter().enumerate() {
        let tree = trees.get(i).copied();
        match input {
            NoteInput::Real(note) => {
                let tree = tree.ok_or(TxBuilderError::EpochTreeNotFound)?;
                let (leaf_index, epoch) = require_confirmed(note)?;
                if epoch != tree.epoch {
                    return Err(TxBuilderError::EpochMismatch {
                        note: epoch,
                        tree: tree.epoch,
                    });
                }
                let proof_data = tree
                    .proof(leaf_index)
                    .map_err(|_| TxBuilderError::EpochTreeNotFound)?;
                let nullifier =
                    commitment::nullifier(&note.commitment, &nullifier_key, epoch, leaf_index);
                input_commitments.push(note.commitment);
                input_nullifiers.push(nullifier);
                input_merkle_roots.push(proof_data.root);
                input_merkle_siblings.push(proof_data.siblings);
                input_leaf_indices.push(leaf_index);
                input_values.push(note.value);
                input_randomness.push(note.randomness);
            }
            NoteInput::Dummy => {
                input_commitments.push([0u8; 32]);
                input_nullifiers.push([0u8; 32]);
                input_merkle_roots.push(tree.map(|t| t.root()).unwrap_or([0u8; 32]));
                input_merkle_siblings.push(vec![[0u8; 32]; crate::merkle::DEPTH]);
                input_leaf_indices.push(0);
                input_values.push(0);
                input_randomness.push([0u8; 32]);
            }
        }
    }

    let mut output_commitments = Vec::new();
    let mut encrypted_outputs = Vec::new();
    for (i, (value, owner)) in outputs.iter().enumerate() {
        let randomness = output_randomness[i];
        output_commitments.push(commitment::commitment(*value, owner, &randomness));
        let mut plaintext = Vec::with_capacity(72);
        plaintext.extend_from_slice(&value.to_le_bytes());
        plaintext.extend_from_slice(&[0u8; 32]); // token: same as inputs, left to caller to track
        plaintext.extend_from_slice(&randomness);
        encrypted_outputs.push(crate::aead::seal(&viewing_keys[i], &plaintext));
    }

    let proof = prover
        .prove_transfer(TransferInputs {
            input_commitments,
            input_nullifiers: input_nullifiers.clone(),
            input_merkle_roots,
            input_merkle_siblings,
            input_leaf_indices,
            input_values,
            input_randomness,
            spending_key,
            output_commitments: output_commitments.clone(),
            output_values: outputs.iter().map(|(v, _)| *v).collect(),
            output_owners: outputs.iter().map(|(_, o)| *o).collect(),
            output_randomness: output_randomness.to_vec(),
            fee,
        })
        .await
        .map_err(|_| TxBuilderError::ProofGenerationFailed)?;

    Ok((
        PreparedTransfer {
            nullifiers: input_nullifiers,
            output_commitments: output_commitments.clone(),
            encrypted_outputs,
            fee,
            proof,
        },
        output_commitments,
    ))
}

/// Renew reissues a note about to expire into the current epoch, with the
/// same value and owner but fresh randomness. Refuses to renew a note
/// that is not actually older than the tree it would be renewed into.
pub async fn build_renew<P: Prover + ?Sized>(
    prover: &P,
    note: &Note,
    old_tree: &EpochTree,
    new_epoch: u64,
    new_randomness: [u8; 32],
    spending_key: [u8; 32],
    nullifier_key: [u8; 32],
    viewing_key: &[u8; 32],
) -> Result<PreparedRenew, TxBuilderError> {
    let (leaf_index, epoch) = require_confirmed(note)?;
    if epoch != old_tree.epoch {
        return Err(TxBuilderError::EpochMismatch {
            note: epoch,
            tree: old_tree.epoch,
        });
    }
    if epoch >= new_epoch {
        return Err(TxBuilderError::RenewNotNeeded);
    }
    let proof_data = old_tree
        .proof(leaf_index)
        .map_err(|_| TxBuilderError::EpochTreeNotFound)?;

    let old_nullifier = commitment::nullifier(&note.commitment, &nullifier_key, epoch, leaf_index);
    let new_commitment = commitment::commitment(note.value, &note.owner, &new_randomness);

    let proof = prover
        .prove_renew(RenewInputs {
            old_commitment: note.commitment,
            old_nullifier,
            merkle_root: proof_data.root,
            merkle_siblings: proof_data.siblings,
            leaf_index,
            value: note.value,
            owner: note.owner,
            old_randomness: note.randomness,
            new_randomness,
            new_commitment,
            spending_key,
        })
        .await
        .map_err(|_| TxBuilderError::ProofGenerationFailed)?;

    let mut plaintext = Vec::with_capacity(72);
    plaintext.extend_from_slice(&note.value.to_le_bytes());
    plaintext.extend_from_slice(&note.token);
    plaintext.extend_from_slice(&new_randomness);
    let encrypted_note = crate::aead::seal(viewing_key, &plaintext);

    Ok(PreparedRenew {
        old_nullifier,
        new_commitment,
        encrypted_note,
        proof,
    })
}
