//! Common types for contract interactions.
use std::fmt;

use game_core::{Address, GameAction};

/// 256-bit unsigned integer in the contract's native big-endian layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word(pub [u8; 32]);

impl Word {
    pub const ZERO: Word = Word([0u8; 32]);

    pub const fn from_u128(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        let low = value.to_be_bytes();
        let mut i = 0;
        while i < 16 {
            bytes[16 + i] = low[i];
            i += 1;
        }
        Self(bytes)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self::from_u128(value as u128)
    }

    /// Lossless conversion; `None` when the upper 128 bits are set.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }
}

impl From<u128> for Word {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u128() {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

/// Transaction hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Handle returned by a submitted write.
///
/// A pending transaction is NOT applied; only a successful
/// [`ContractWriter::confirm`](crate::ContractWriter::confirm) guarantees that.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
    pub action: GameAction,
    pub sender: Address,
}

/// Proof that a write reached finality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Contract entry point invoked for an action.
pub const fn method_name(action: &GameAction) -> &'static str {
    match action {
        GameAction::Start { .. } => "startGame",
        GameAction::Hit => "hit",
        GameAction::Stand => "stand",
        GameAction::ClaimPayout => "payout",
        GameAction::Reset => "resetGame",
    }
}
