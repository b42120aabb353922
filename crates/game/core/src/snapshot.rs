//! Immutable local copy of the remote game state.
//!
//! A [`GameSnapshot`] is built wholesale on every successful refresh and is
//! never mutated afterwards; a newer snapshot simply replaces the older one.
use std::fmt;

use crate::card::Card;
use crate::identity::Address;
use crate::units::Wei;

/// Player totals above this value are a bust.
pub const BUST_THRESHOLD: u128 = 21;

/// Game phase as reported by `gameState()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    Idle,
    PlayerTurn,
    DealerTurn,
    Finished,
    /// Code the client does not recognize; shown as its raw number.
    Unknown(u64),
}

impl GameStatus {
    /// All statuses the authority is known to report.
    pub const KNOWN: [GameStatus; 4] = [
        GameStatus::Idle,
        GameStatus::PlayerTurn,
        GameStatus::DealerTurn,
        GameStatus::Finished,
    ];

    pub const fn from_code(code: u64) -> Self {
        match code {
            0 => GameStatus::Idle,
            1 => GameStatus::PlayerTurn,
            2 => GameStatus::DealerTurn,
            3 => GameStatus::Finished,
            other => GameStatus::Unknown(other),
        }
    }

    pub const fn code(self) -> u64 {
        match self {
            GameStatus::Idle => 0,
            GameStatus::PlayerTurn => 1,
            GameStatus::DealerTurn => 2,
            GameStatus::Finished => 3,
            GameStatus::Unknown(code) => code,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Idle => f.write_str("idle"),
            GameStatus::PlayerTurn => f.write_str("player_turn"),
            GameStatus::DealerTurn => f.write_str("dealer_turn"),
            GameStatus::Finished => f.write_str("finished"),
            GameStatus::Unknown(code) => write!(f, "{code}"),
        }
    }
}

/// Round result as reported by `gameResult()` and the finish event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    None,
    PlayerWin,
    DealerWin,
    Push,
    Unknown(u64),
}

impl GameOutcome {
    pub const KNOWN: [GameOutcome; 4] = [
        GameOutcome::None,
        GameOutcome::PlayerWin,
        GameOutcome::DealerWin,
        GameOutcome::Push,
    ];

    pub const fn from_code(code: u64) -> Self {
        match code {
            0 => GameOutcome::None,
            1 => GameOutcome::PlayerWin,
            2 => GameOutcome::DealerWin,
            3 => GameOutcome::Push,
            other => GameOutcome::Unknown(other),
        }
    }

    pub const fn code(self) -> u64 {
        match self {
            GameOutcome::None => 0,
            GameOutcome::PlayerWin => 1,
            GameOutcome::DealerWin => 2,
            GameOutcome::Push => 3,
            GameOutcome::Unknown(code) => code,
        }
    }

    /// Outcomes that entitle the recorded player to claim a payout.
    pub const fn is_payable(self) -> bool {
        matches!(self, GameOutcome::PlayerWin | GameOutcome::Push)
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::None => f.write_str("none"),
            GameOutcome::PlayerWin => f.write_str("player_win"),
            GameOutcome::DealerWin => f.write_str("dealer_win"),
            GameOutcome::Push => f.write_str("push"),
            GameOutcome::Unknown(code) => write!(f, "{code}"),
        }
    }
}

/// Canonical state mirrored from the authority at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub status: GameStatus,
    pub outcome: GameOutcome,
    /// Stake in wei.
    pub bet: Wei,
    pub recorded_player: Address,
    pub player_cards: Vec<Card>,
    pub dealer_cards: Vec<Card>,
    pub player_score: u128,
    pub dealer_score: u128,
}

impl GameSnapshot {
    /// Snapshot of a contract that has never been played.
    pub fn idle() -> Self {
        Self {
            status: GameStatus::Idle,
            outcome: GameOutcome::None,
            bet: 0,
            recorded_player: Address::ZERO,
            player_cards: Vec::new(),
            dealer_cards: Vec::new(),
            player_score: 0,
            dealer_score: 0,
        }
    }

    pub fn is_recorded_player(&self, identity: &Address) -> bool {
        self.recorded_player == *identity
    }

    pub fn player_busted(&self) -> bool {
        self.player_score > BUST_THRESHOLD
    }
}
