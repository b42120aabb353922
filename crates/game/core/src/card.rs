//! Card codes as reported by the remote authority.
//!
//! The contract only ever hands out a rank (1..=13). Suits are not modeled;
//! the red/black color is a fixed cosmetic rule derived from rank parity.
use std::borrow::Cow;
use std::fmt;

/// Display names indexed by `rank - 1`.
const RANK_NAMES: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

/// Cosmetic color attribute used by presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CardColor {
    Red,
    Black,
}

/// A dealt card, holding the raw code reported on-chain.
///
/// The code is kept at the contract's full 256-bit big-endian width so that an
/// unexpected value can still be shown to the player as its raw numeral
/// instead of being dropped or breaking the snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Card {
    code: [u8; 32],
}

impl Card {
    pub const MIN_RANK: u64 = 1;
    pub const MAX_RANK: u64 = 13;

    pub const fn from_code(code: u64) -> Self {
        let mut bytes = [0u8; 32];
        let low = code.to_be_bytes();
        let mut i = 0;
        while i < 8 {
            bytes[24 + i] = low[i];
            i += 1;
        }
        Self { code: bytes }
    }

    /// Card from a raw 256-bit word.
    pub const fn from_be_bytes(code: [u8; 32]) -> Self {
        Self { code }
    }

    /// The code if it fits in 64 bits.
    pub fn code(self) -> Option<u64> {
        if self.code[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.code[24..]);
        Some(u64::from_be_bytes(low))
    }

    /// Rank in `1..=13`, or `None` for an unrecognized code.
    pub fn rank(self) -> Option<u8> {
        self.code()
            .filter(|code| (Self::MIN_RANK..=Self::MAX_RANK).contains(code))
            .map(|code| code as u8)
    }

    /// Display name from the fixed table, falling back to the raw numeral.
    ///
    /// Codes wider than 128 bits are shown in hex.
    pub fn name(self) -> Cow<'static, str> {
        if let Some(rank) = self.rank() {
            return Cow::Borrowed(RANK_NAMES[usize::from(rank) - 1]);
        }
        if self.code[..16].iter().all(|b| *b == 0) {
            let mut low = [0u8; 16];
            low.copy_from_slice(&self.code[16..]);
            return Cow::Owned(u128::from_be_bytes(low).to_string());
        }
        let first = self.code.iter().position(|b| *b != 0).unwrap_or(0);
        Cow::Owned(format!("0x{}", hex::encode(&self.code[first..])))
    }

    /// Odd ranks are red, even ranks and unrecognized codes are black.
    pub fn color(self) -> CardColor {
        match self.rank() {
            Some(rank) if rank % 2 == 1 => CardColor::Red,
            _ => CardColor::Black,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
