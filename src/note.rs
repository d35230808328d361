//! Note lifecycle management: commitment/nullifier derivation already lives
//! in `commitment.rs`; this module owns the note value type plus the store
//! that tracks confirmation, spend status, expiry and coin selection
//! (§3, §4.6).

use std::collections::HashMap;

use rand::RngCore;

use crate::commitment;
use crate::config::PoolConfig;
use crate::error::NoteStoreError;

/// A single note (UTXO). Constructed pending (no `leaf_index`/`epoch`),
/// confirmed once observed on-chain, spent once its nullifier appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub value: u64,
    pub token: [u8; 32],
    pub owner: [u8; 32],
    pub randomness: [u8; 32],
    pub memo: Option<Vec<u8>>,
    pub commitment: [u8; 32],
    pub leaf_index: Option<u32>,
    pub epoch: Option<u64>,
    pub nullifier: Option<[u8; 32]>,
    pub spent: bool,
}

impl Note {
    pub fn new_pending(
        value: u64,
        token: [u8; 32],
        owner: [u8; 32],
        randomness: [u8; 32],
        memo: Option<Vec<u8>>,
    ) -> Self {
        let commitment = commitment::commitment(value, &owner, &randomness);
        Self {
            value,
            token,
            owner,
            randomness,
            memo,
            commitment,
            leaf_index: None,
            epoch: None,
            nullifier: None,
            spent: false,
        }
    }

    /// Recompute the nullifier once `leaf_index`/`epoch` are known; requires
    /// the spender's nullifier key since it is not part of the note itself.
    pub fn recompute_nullifier(&mut self, nullifier_key: &[u8; 32]) -> Option<[u8; 32]> {
        let leaf_index = self.leaf_index?;
        let epoch = self.epoch?;
        let n = commitment::nullifier(&self.commitment, nullifier_key, epoch, leaf_index);
        self.nullifier = Some(n);
        Some(n)
    }

    pub fn is_expiring(&self, current_epoch: u64, warning_epochs: u64) -> bool {
        match self.epoch {
            Some(e) => e < current_epoch && e + warning_epochs >= current_epoch,
            None => false,
        }
    }

    pub fn is_expired(&self, current_epoch: u64, horizon_epochs: u64) -> bool {
        match self.epoch {
            Some(e) => e < current_epoch.saturating_sub(horizon_epochs),
            None => false,
        }
    }

    /// Fixed local layout: value(32 BE) || token(32) || owner(32) ||
    /// randomness(32) || memo_len(u16 LE) || memo.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + 2 + self.memo.as_ref().map_or(0, |m| m.len()));
        let mut value_be = [0u8; 32];
        value_be[24..].copy_from_slice(&self.value.to_be_bytes());
        out.extend_from_slice(&value_be);
        out.extend_from_slice(&self.token);
        out.extend_from_slice(&self.owner);
        out.extend_from_slice(&self.randomness);
        let memo = self.memo.as_deref().unwrap_or(&[]);
        out.extend_from_slice(&(memo.len() as u16).to_le_bytes());
        out.extend_from_slice(memo);
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 130 {
            return None;
        }
        let value = u64::from_be_bytes(bytes[24..32].try_into().ok()?);
        let token: [u8; 32] = bytes[32..64].try_into().ok()?;
        let owner: [u8; 32] = bytes[64..96].try_into().ok()?;
        let randomness: [u8; 32] = bytes[96..128].try_into().ok()?;
        let memo_len = u16::from_le_bytes(bytes[128..130].try_into().ok()?) as usize;
        let memo_bytes = bytes.get(130..130 + memo_len)?;
        let memo = if memo_len == 0 {
            None
        } else {
            Some(memo_bytes.to_vec())
        };
        Some(Note::new_pending(value, token, owner, randomness, memo))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSummary {
    pub total: u64,
    pub spendable: u64,
    pub pending: u64,
    pub expiring: u64,
    pub expired: u64,
    pub count_spendable: usize,
    pub count_expiring: usize,
    pub count_expired: usize,
    pub earliest_expiry: Option<u64>,
}

/// Owns confirmed notes (insertion-ordered, indexed by commitment) and a
/// pending set. No internal locking: the store assumes exclusive access
/// during a mutation, per §5 — it is a handle passed by reference between
/// the scanner and the transaction builder.
#[derive(Debug, Default)]
pub struct NoteStore {
    confirmed: Vec<Note>,
    index: HashMap<[u8; 32], usize>,
    pending: HashMap<[u8; 32], Note>,
    current_epoch: u64,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_epoch(&mut self, epoch: u64) {
        self.current_epoch = epoch;
    }

    pub fn current_epoch(&self) -> u64 {
        self.current_epoch
    }

    /// Insert or back-fill a confirmed note. If the commitment already
    /// exists, only previously-absent `leaf_index`/`epoch` are filled in;
    /// value is never updated.
    pub fn add(&mut self, note: Note) {
        if let Some(&idx) = self.index.get(&note.commitment) {
            let existing = &mut self.confirmed[idx];
            if existing.leaf_index.is_none() {
                existing.leaf_index = note.leaf_index;
            }
            if existing.epoch.is_none() {
                existing.epoch = note.epoch;
            }
            return;
        }
        self.pending.remove(&note.commitment);
        self.index.insert(note.commitment, self.confirmed.len());
        self.confirmed.push(note);
    }

    pub fn add_pending(&mut self, note: Note) {
        self.pending.entry(note.commitment).or_insert(note);
    }

    pub fn pending_notes(&self) -> impl Iterator<Item = &Note> {
        self.pending.values()
    }

    pub fn confirmed_notes(&self) -> &[Note] {
        &self.confirmed
    }

    pub fn find_by_commitment(&self, commitment: &[u8; 32]) -> Option<&Note> {
        self.index.get(commitment).map(|&i| &self.confirmed[i])
    }

    pub fn mark_spent(&mut self, commitment: &[u8; 32]) {
        if let Some(&idx) = self.index.get(commitment) {
            self.confirmed[idx].spent = true;
        }
    }

    /// No-op if the nullifier is unknown (a spend arriving before the
    /// matching confirmation is expected, not an error — §5).
    pub fn mark_spent_by_nullifier(&mut self, nullifier: &[u8; 32], epoch_hint: Option<u64>) {
        if let Some(note) = self.confirmed.iter_mut().find(|n| {
            !n.spent
                && n.nullifier.as_ref() == Some(nullifier)
                && epoch_hint.map_or(true, |e| n.epoch == Some(e))
        }) {
            note.spent = true;
        }
    }

    fn unspent(&self) -> impl Iterator<Item = &Note> {
        self.confirmed.iter().filter(|n| !n.spent)
    }

    /// Greedy coin selection: dedup by commitment (the store already
    /// guarantees uniqueness), sort by (epoch ascending, value descending)
    /// — draining older notes first lowers expiry risk — then accumulate
    /// until both the amount and `min_notes` floor are satisfied.
    pub fn select_notes(&self, amount: u64, min_notes: usize) -> Result<Vec<Note>, NoteStoreError> {
        if min_notes < 1 {
            return Err(NoteStoreError::InvalidMinNotes);
        }

        let mut candidates: Vec<&Note> = self.unspent().collect();
        candidates.sort_by(|a, b| {
            let epoch_a = a.epoch.unwrap_or(u64::MAX);
            let epoch_b = b.epoch.unwrap_or(u64::MAX);
            epoch_a.cmp(&epoch_b).then(b.value.cmp(&a.value))
        });

        let total: u64 = candidates.iter().map(|n| n.value).sum();
        if total < amount {
            return Err(NoteStoreError::InsufficientBalance {
                have: total,
                need: amount,
            });
        }

        let mut selected = Vec::new();
        let mut sum = 0u64;
        for note in candidates {
            if sum >= amount && selected.len() >= min_notes {
                break;
            }
            sum += note.value;
            selected.push(note.clone());
        }

        if selected.len() < min_notes {
            return Err(NoteStoreError::InsufficientNotes {
                have: selected.len(),
                need: min_notes,
            });
        }

        Ok(selected)
    }

    pub fn select_notes_for_renewal(&self, max: usize) -> Vec<Note> {
        let mut expiring: Vec<&Note> = self.expiring_notes_refs();
        expiring.sort_by_key(|n| n.epoch.unwrap_or(u64::MAX));
        expiring.into_iter().take(max).cloned().collect()
    }

    fn expiring_notes_refs(&self) -> Vec<&Note> {
        self.unspent()
            .filter(|n| match n.epoch {
                Some(e) => e < self.current_epoch && e + 2 >= self.current_epoch,
                None => false,
            })
            .collect()
    }

    pub fn expiring_notes(&self, config: &PoolConfig) -> Vec<&Note> {
        self.unspent()
            .filter(|n| n.is_expiring(self.current_epoch, config.expiry_warning_epochs))
            .collect()
    }

    pub fn expired_notes(&self, config: &PoolConfig) -> Vec<&Note> {
        self.unspent()
            .filter(|n| n.is_expired(self.current_epoch, config.expiry_horizon_epochs()))
            .collect()
    }

    pub fn balance(&self) -> u64 {
        self.unspent().map(|n| n.value).sum()
    }

    pub fn balance_info(&self, config: &PoolConfig) -> BalanceSummary {
        let horizon = config.expiry_horizon_epochs();
        let mut summary = BalanceSummary::default();

        for note in self.unspent() {
            summary.total += note.value;
            if note.is_expired(self.current_epoch, horizon) {
                summary.expired += note.value;
                summary.count_expired += 1;
            } else if note.is_expiring(self.current_epoch, config.expiry_warning_epochs) {
                summary.expiring += note.value;
                summary.count_expiring += 1;
                summary.earliest_expiry = Some(match summary.earliest_expiry {
                    Some(e) => e.min(note.epoch.unwrap_or(e)),
                    None => note.epoch.unwrap_or(self.current_epoch),
                });
            } else {
                summary.spendable += note.value;
                summary.count_spendable += 1;
            }
        }

        summary.pending = self.pending.values().map(|n| n.value).sum();
        summary
    }

    /// Build a fresh pending note with cryptographically strong randomness.
    /// The nullifier is left absent until confirmation (§9 Open Question
    /// resolution) rather than cached with a placeholder `leaf_index = 0`.
    pub fn create_note(&self, value: u64, owner: [u8; 32], token: Option<[u8; 32]>) -> Note {
        let mut randomness = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut randomness);
        Note::new_pending(value, token.unwrap_or([0u8; 32]), owner, randomness, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(value: u64, epoch: u64) -> Note {
        let mut n = Note::new_pending(value, [0u8; 32], [9u8; 32], [epoch as u8; 32], None);
        n.leaf_index = Some(0);
        n.epoch = Some(epoch);
        n
    }

    #[test]
    fn coin_selection_prefers_oldest_epoch_first() {
        let mut store = NoteStore::new();
        store.add(note(1000, 3));
        store.add(note(1000, 1));
        store.add(note(1000, 2));

        let selected = store.select_notes(1000, 1).unwrap();
        assert_eq!(selected[0].epoch, Some(1));
    }

    #[test]
    fn insufficient_balance_errors() {
        let mut store = NoteStore::new();
        store.add(note(100, 0));
        assert_eq!(
            store.select_notes(1000, 1),
            Err(NoteStoreError::InsufficientBalance { have: 100, need: 1000 })
        );
    }

    #[test]
    fn invalid_min_notes_errors() {
        let store = NoteStore::new();
        assert_eq!(store.select_notes(0, 0), Err(NoteStoreError::InvalidMinNotes));
    }

    #[test]
    fn duplicate_commitment_only_backfills_metadata() {
        let mut store = NoteStore::new();
        let mut n = note(500, 2);
        n.leaf_index = None;
        n.epoch = None;
        let commitment = n.commitment;
        store.add(n.clone());

        let mut confirmed = n.clone();
        confirmed.leaf_index = Some(7);
        confirmed.epoch = Some(2);
        confirmed.value = 999; // must be ignored
        store.add(confirmed);

        let stored = store.find_by_commitment(&commitment).unwrap();
        assert_eq!(stored.value, 500);
        assert_eq!(stored.leaf_index, Some(7));
    }

    #[test]
    fn mark_spent_by_unknown_nullifier_is_noop() {
        let mut store = NoteStore::new();
        store.add(note(500, 1));
        store.mark_spent_by_nullifier(&[0xFF; 32], None);
        assert_eq!(store.balance(), 500);
    }

    #[test]
    fn note_serialization_round_trips() {
        let note = Note::new_pending(
            1_000_000,
            [0xAA; 32],
            [0xBB; 32],
            [0xCC; 32],
            Some(b"hello".to_vec()),
        );
        let bytes = note.serialize();
        assert_eq!(bytes.len(), 135);
        let expected = "00000000000000000000000000000000000000000000000000000000000f4240aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc050068656c6c6f";
        assert_eq!(hex::encode(&bytes), expected);

        let restored = Note::deserialize(&bytes).unwrap();
        assert_eq!(restored.value, note.value);
        assert_eq!(restored.token, note.token);
        assert_eq!(restored.owner, note.owner);
        assert_eq!(restored.randomness, note.randomness);
        assert_eq!(restored.memo, note.memo);
        assert_eq!(restored.commitment, note.commitment);
    }
}
