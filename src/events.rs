//! Binary event parser (§4.7, §6.1).
//!
//! Every event begins with an 8-byte discriminator. Unknown discriminators
//! are ignored; truncated payloads yield `None` rather than panicking — a
//! scanner sees events belonging to other pools and other users constantly,
//! so both outcomes are routine, not exceptional.

use crate::codec::Decoder;

pub const DEPOSIT_V2: [u8; 8] = [0xa4, 0xd6, 0x2a, 0x2f, 0x25, 0xf5, 0x58, 0x6a];
pub const WITHDRAW_V2: [u8; 8] = [0xe7, 0xe7, 0x67, 0x4f, 0xbb, 0x93, 0x72, 0xb4];
pub const TRANSFER_V2: [u8; 8] = [0x5c, 0x93, 0xfe, 0x4c, 0x44, 0xc9, 0xa0, 0x80];
pub const RENEW_V2: [u8; 8] = [0x97, 0x7e, 0x4e, 0x25, 0x5c, 0x7d, 0x9e, 0xa7];
pub const EPOCH_ROLLOVER: [u8; 8] = [0x12, 0xb3, 0x4a, 0x7f, 0x81, 0x5c, 0x2e, 0x9f];
pub const EPOCH_FINALIZED: [u8; 8] = [0x3f, 0xa9, 0x8c, 0x12, 0x67, 0x4b, 0xd1, 0xe3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    pub epoch: u64,
    pub pool: [u8; 32],
    pub commitment: [u8; 32],
    pub leaf_index: u32,
    pub new_root: [u8; 32],
    pub encrypted_note: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawEvent {
    pub epoch: u64,
    pub pool: [u8; 32],
    pub nullifier: [u8; 32],
    pub amount: u64,
    pub recipient: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub output_epoch: u64,
    pub pool: [u8; 32],
    pub nullifiers: Vec<[u8; 32]>,
    pub input_epochs: Vec<u64>,
    pub commitments: Vec<[u8; 32]>,
    pub leaf_indices: Vec<u32>,
    pub encrypted_notes: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewEvent {
    pub source_epoch: u64,
    pub target_epoch: u64,
    pub pool: [u8; 32],
    pub nullifier: [u8; 32],
    pub commitment: [u8; 32],
    pub leaf_index: u32,
    pub encrypted_note: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRolloverEvent {
    pub previous_epoch: u64,
    pub new_epoch: u64,
    pub pool: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochFinalizedEvent {
    pub epoch: u64,
    pub pool: [u8; 32],
    pub merkle_root: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    Transfer(TransferEvent),
    Renew(RenewEvent),
    EpochRollover(EpochRolloverEvent),
    EpochFinalized(EpochFinalizedEvent),
}

/// u64 on the wire, truncated to u32 by the reader per §6.1's note.
fn leaf_index_u32(dec: &mut Decoder) -> Result<u32, ()> {
    dec.u64().map(|v| v as u32).map_err(|_| ())
}

fn parse_deposit(dec: &mut Decoder) -> Option<DepositEvent> {
    Some(DepositEvent {
        epoch: dec.u64().ok()?,
        pool: dec.fixed_array().ok()?,
        commitment: dec.fixed_array().ok()?,
        leaf_index: leaf_index_u32(dec).ok()?,
        new_root: dec.fixed_array().ok()?,
        encrypted_note: dec.bytes_with_len().ok()?.to_vec(),
    })
}

fn parse_withdraw(dec: &mut Decoder) -> Option<WithdrawEvent> {
    Some(WithdrawEvent {
        epoch: dec.u64().ok()?,
        pool: dec.fixed_array().ok()?,
        nullifier: dec.fixed_array().ok()?,
        amount: dec.u64().ok()?,
        recipient: dec.fixed_array().ok()?,
    })
}

fn parse_transfer(dec: &mut Decoder) -> Option<TransferEvent> {
    let output_epoch = dec.u64().ok()?;
    let pool = dec.fixed_array().ok()?;
    let nullifiers = dec.vec(|d| d.fixed_array()).ok()?;
    let input_epochs = dec.vec(|d| d.u64()).ok()?;
    let commitments = dec.vec(|d| d.fixed_array()).ok()?;
    let leaf_indices = dec.vec(|d| d.u64().map(|v| v as u32)).ok()?;
    let encrypted_notes = dec
        .vec(|d| d.bytes_with_len().map(|b| b.to_vec()))
        .ok()?;
    Some(TransferEvent {
        output_epoch,
        pool,
        nullifiers,
        input_epochs,
        commitments,
        leaf_indices,
        encrypted_notes,
    })
}

fn parse_renew(dec: &mut Decoder) -> Option<RenewEvent> {
    Some(RenewEvent {
        source_epoch: dec.u64().ok()?,
        target_epoch: dec.u64().ok()?,
        pool: dec.fixed_array().ok()?,
        nullifier: dec.fixed_array().ok()?,
        commitment: dec.fixed_array().ok()?,
        leaf_index: leaf_index_u32(dec).ok()?,
        encrypted_note: dec.bytes_with_len().ok()?.to_vec(),
    })
}

fn parse_epoch_rollover(dec: &mut Decoder) -> Option<EpochRolloverEvent> {
    Some(EpochRolloverEvent {
        previous_epoch: dec.u64().ok()?,
        new_epoch: dec.u64().ok()?,
        pool: dec.fixed_array().ok()?,
    })
}

fn parse_epoch_finalized(dec: &mut Decoder) -> Option<EpochFinalizedEvent> {
    Some(EpochFinalizedEvent {
        epoch: dec.u64().ok()?,
        pool: dec.fixed_array().ok()?,
        merkle_root: dec.fixed_array().ok()?,
    })
}

/// Parse a raw event record. Returns `None` for an unrecognized
/// discriminator or a truncated payload.
pub fn parse_event(bytes: &[u8]) -> Option<Event> {
    if bytes.len() < 8 {
        return None;
    }
    let (disc, rest) = bytes.split_at(8);
    let mut dec = Decoder::new(rest);

    match disc {
        d if d == DEPOSIT_V2 => parse_deposit(&mut dec).map(Event::Deposit),
        d if d == WITHDRAW_V2 => parse_withdraw(&mut dec).map(Event::Withdraw),
        d if d == TRANSFER_V2 => parse_transfer(&mut dec).map(Event::Transfer),
        d if d == RENEW_V2 => parse_renew(&mut dec).map(Event::Renew),
        d if d == EPOCH_ROLLOVER => parse_epoch_rollover(&mut dec).map(Event::EpochRollover),
        d if d == EPOCH_FINALIZED => parse_epoch_finalized(&mut dec).map(Event::EpochFinalized),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;

    #[test]
    fn unknown_discriminator_is_ignored() {
        let mut bytes = vec![0xFFu8; 8];
        bytes.extend_from_slice(&[0u8; 40]);
        assert_eq!(parse_event(&bytes), None);
    }

    #[test]
    fn truncated_withdraw_is_none() {
        let mut bytes = WITHDRAW_V2.to_vec();
        bytes.extend_from_slice(&[0u8; 3]); // far short of the payload
        assert_eq!(parse_event(&bytes), None);
    }

    #[test]
    fn round_trips_withdraw() {
        let mut enc = Encoder::new();
        enc.u64(5)
            .fixed_bytes(&[1u8; 32])
            .fixed_bytes(&[2u8; 32])
            .u64(1_000_000)
            .fixed_bytes(&[3u8; 32]);
        let mut bytes = WITHDRAW_V2.to_vec();
        bytes.extend(enc.into_bytes());

        let event = parse_event(&bytes).unwrap();
        assert_eq!(
            event,
            Event::Withdraw(WithdrawEvent {
                epoch: 5,
                pool: [1u8; 32],
                nullifier: [2u8; 32],
                amount: 1_000_000,
                recipient: [3u8; 32],
            })
        );
    }

    #[test]
    fn round_trips_deposit() {
        let mut enc = Encoder::new();
        enc.u64(3)
            .fixed_bytes(&[1u8; 32])
            .fixed_bytes(&[2u8; 32])
            .u64(7) // leafIndex as u64 on the wire
            .fixed_bytes(&[4u8; 32])
            .bytes_with_len(&[9, 9, 9]);
        let mut bytes = DEPOSIT_V2.to_vec();
        bytes.extend(enc.into_bytes());

        let event = parse_event(&bytes).unwrap();
        assert_eq!(
            event,
            Event::Deposit(DepositEvent {
                epoch: 3,
                pool: [1u8; 32],
                commitment: [2u8; 32],
                leaf_index: 7,
                new_root: [4u8; 32],
                encrypted_note: vec![9, 9, 9],
            })
        );
    }
}
