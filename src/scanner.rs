//! Single-threaded event scanner (§4.8).
//!
//! Consumes parsed events and drives a [`NoteStore`] forward: deposits are
//! trial-decrypted against the holder's viewing key, accepted only once the
//! recomputed commitment matches the on-chain one, and withdraw/transfer
//! events mark owned notes spent by nullifier. This mirrors the teacher's
//! note scanner's shape — single key material, `Rc<RefCell<_>>` shared state,
//! no threads — per the cooperative single-threaded model the spec calls
//! for; there is no async I/O inside the scan loop itself, only in the
//! prover boundary.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::aead;
use crate::commitment;
use crate::error::ScannerError;
use crate::events::Event;
use crate::note::{Note, NoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanKeys {
    pub viewing_key: [u8; 32],
    pub nullifier_key: [u8; 32],
    pub owner: [u8; 32],
}

pub struct Scanner {
    pool: [u8; 32],
    keys: ScanKeys,
    store: Rc<RefCell<NoteStore>>,
}

/// Decoded shielded note payload, the plaintext behind a deposit/transfer's
/// encrypted blob.
struct NotePayload {
    value: u64,
    token: [u8; 32],
    randomness: [u8; 32],
    memo: Option<Vec<u8>>,
}

fn decode_payload(plaintext: &[u8]) -> Option<NotePayload> {
    if plaintext.len() < 72 {
        return None;
    }
    let value = u64::from_le_bytes(plaintext[0..8].try_into().ok()?);
    let token: [u8; 32] = plaintext[8..40].try_into().ok()?;
    let randomness: [u8; 32] = plaintext[40..72].try_into().ok()?;
    let memo = if plaintext.len() > 72 {
        Some(plaintext[72..].to_vec())
    } else {
        None
    };
    Some(NotePayload {
        value,
        token,
        randomness,
        memo,
    })
}

impl Scanner {
    pub fn new(pool: [u8; 32], keys: ScanKeys, store: Rc<RefCell<NoteStore>>) -> Self {
        Self { pool, keys, store }
    }

    /// Try to decrypt and accept a deposit/renew/transfer-output note. The
    /// recomputed commitment must match the on-chain one or the note is
    /// discarded as not ours (or corrupted) — a decryption or mismatch
    /// failure here is routine, never an error.
    fn try_accept(
        &self,
        epoch: u64,
        leaf_index: u32,
        on_chain_commitment: [u8; 32],
        encrypted_note: &[u8],
    ) -> Option<Note> {
        let plaintext = aead::open(&self.keys.viewing_key, encrypted_note)?;
        let payload = decode_payload(&plaintext)?;

        let recomputed = commitment::commitment(payload.value, &self.keys.owner, &payload.randomness);
        if recomputed != on_chain_commitment {
            trace!("decrypted note commitment mismatch, discarding");
            return None;
        }

        let mut note = Note::new_pending(
            payload.value,
            payload.token,
            self.keys.owner,
            payload.randomness,
            payload.memo,
        );
        note.leaf_index = Some(leaf_index);
        note.epoch = Some(epoch);
        note.recompute_nullifier(&self.keys.nullifier_key);
        Some(note)
    }

    pub fn process(&self, event: &Event) -> Result<(), ScannerError> {
        match event {
            Event::Deposit(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                if let Some(note) = self.try_accept(e.epoch, e.leaf_index, e.commitment, &e.encrypted_note) {
                    debug!(value = note.value, epoch = e.epoch, "accepted deposit note");
                    self.store.borrow_mut().add(note);
                }
            }
            Event::Withdraw(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                self.store
                    .borrow_mut()
                    .mark_spent_by_nullifier(&e.nullifier, Some(e.epoch));
            }
            Event::Transfer(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                for (nullifier, input_epoch) in e.nullifiers.iter().zip(e.input_epochs.iter()) {
                    self.store
                        .borrow_mut()
                        .mark_spent_by_nullifier(nullifier, Some(*input_epoch));
                }
                for ((commitment, leaf_index), encrypted_note) in e
                    .commitments
                    .iter()
                    .zip(e.leaf_indices.iter())
                    .zip(e.encrypted_notes.iter())
                {
                    if let Some(note) =
                        self.try_accept(e.output_epoch, *leaf_index, *commitment, encrypted_note)
                    {
                        debug!(value = note.value, "accepted transfer output note");
                        self.store.borrow_mut().add(note);
                    }
                }
            }
            Event::Renew(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                self.store
                    .borrow_mut()
                    .mark_spent_by_nullifier(&e.nullifier, Some(e.source_epoch));
                if let Some(note) =
                    self.try_accept(e.target_epoch, e.leaf_index, e.commitment, &e.encrypted_note)
                {
                    debug!(value = note.value, "accepted renewed note");
                    self.store.borrow_mut().add(note);
                }
            }
            Event::EpochRollover(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                self.store.borrow_mut().set_current_epoch(e.new_epoch);
            }
            Event::EpochFinalized(e) => {
                if e.pool != self.pool {
                    return Ok(());
                }
                warn!(epoch = e.epoch, "epoch finalized");
            }
        }
        Ok(())
    }

    /// Parse and process a raw event record. Unknown discriminators and
    /// truncated records are silently ignored, matching the events module's
    /// own contract.
    pub fn process_raw(&self, bytes: &[u8]) -> Result<(), ScannerError> {
        match crate::events::parse_event(bytes) {
            Some(event) => self.process(&event),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DepositEvent, WithdrawEvent};

    fn scanner_with(store: Rc<RefCell<NoteStore>>) -> (Scanner, ScanKeys, [u8; 32]) {
        let pool = [9u8; 32];
        let keys = ScanKeys {
            viewing_key: [1u8; 32],
            nullifier_key: [2u8; 32],
            owner: [3u8; 32],
        };
        (Scanner::new(pool, keys, store), keys, pool)
    }

    fn seal_note(viewing_key: &[u8; 32], value: u64, token: [u8; 32], randomness: [u8; 32]) -> Vec<u8> {
        let mut plaintext = Vec::new();
        plaintext.extend_from_slice(&value.to_le_bytes());
        plaintext.extend_from_slice(&token);
        plaintext.extend_from_slice(&randomness);
        aead::seal(viewing_key, &plaintext)
    }

    #[test]
    fn accepts_own_deposit_and_ignores_foreign_pool() {
        let store = Rc::new(RefCell::new(NoteStore::new()));
        let (scanner, keys, pool) = scanner_with(store.clone());

        let randomness = [7u8; 32];
        let token = [4u8; 32];
        let value = 5_000u64;
        let commitment = commitment::commitment(value, &keys.owner, &randomness);
        let encrypted = seal_note(&keys.viewing_key, value, token, randomness);

        let event = Event::Deposit(DepositEvent {
            epoch: 1,
            pool,
            commitment,
            leaf_index: 0,
            new_root: [0u8; 32],
            encrypted_note: encrypted.clone(),
        });
        scanner.process(&event).unwrap();
        assert_eq!(store.borrow().confirmed_notes().len(), 1);

        let foreign = Event::Deposit(DepositEvent {
            epoch: 1,
            pool: [0xFFu8; 32],
            commitment,
            leaf_index: 1,
            new_root: [0u8; 32],
            encrypted_note: encrypted,
        });
        scanner.process(&foreign).unwrap();
        assert_eq!(store.borrow().confirmed_notes().len(), 1);
    }

    #[test]
    fn undecryptable_note_is_silently_skipped() {
        let store = Rc::new(RefCell::new(NoteStore::new()));
        let (scanner, _keys, pool) = scanner_with(store.clone());

        let event = Event::Deposit(DepositEvent {
            epoch: 1,
            pool,
            commitment: [1u8; 32],
            leaf_index: 0,
            new_root: [0u8; 32],
            encrypted_note: vec![0u8; 40],
        });
        scanner.process(&event).unwrap();
        assert!(store.borrow().confirmed_notes().is_empty());
    }

    #[test]
    fn withdraw_marks_note_spent() {
        let store = Rc::new(RefCell::new(NoteStore::new()));
        let (scanner, keys, pool) = scanner_with(store.clone());

        let randomness = [7u8; 32];
        let value = 100u64;
        let commitment = commitment::commitment(value, &keys.owner, &randomness);
        let mut note = Note::new_pending(value, [0u8; 32], keys.owner, randomness, None);
        note.leaf_index = Some(0);
        note.epoch = Some(1);
        let nullifier = note.recompute_nullifier(&keys.nullifier_key).unwrap();
        store.borrow_mut().add(note);
        assert_eq!(commitment, store.borrow().confirmed_notes()[0].commitment);

        let event = Event::Withdraw(WithdrawEvent {
            epoch: 1,
            pool,
            nullifier,
            amount: value,
            recipient: [0u8; 32],
        });
        scanner.process(&event).unwrap();
        assert!(store.borrow().confirmed_notes()[0].spent);
    }
}
