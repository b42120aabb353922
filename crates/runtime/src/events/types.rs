//! Event types for different topics.
//!
//! Payloads are structured; turning them into display text is left to the
//! frontend.
use std::sync::Arc;

use game_core::{ActionKind, Address, Card, GameOutcome, GameSnapshot, GameStatus, NetworkInfo, Wei};

/// Canonical snapshot changes.
#[derive(Debug, Clone)]
pub enum SnapshotEvent {
    /// A reconciled snapshot became the current one.
    Applied {
        epoch: u64,
        snapshot: Arc<GameSnapshot>,
    },
    /// The session was torn down and its snapshot dropped.
    Cleared,
}

/// Transient status-line changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Notice(Notice),
    /// A write was rejected or reverted.
    ActionFailed { action: ActionKind, reason: String },
    /// The player's running total went over 21 before the authority finished
    /// the round.
    BustAdvisory { total: u128 },
    /// Fallback refresh result: drop any error and show the derived status.
    Restore {
        status: GameStatus,
        outcome: GameOutcome,
    },
}

/// Informational messages raised by actions and remote events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Optimistic notice shown before submission.
    ActionPending(ActionKind),
    ActionConfirmed(ActionKind),
    GameStarted { player: Address, bet: Wei },
    PlayerDrew { card: Card, total: u128 },
    DealerDrew { card: Card, total: u128 },
    GameFinished { outcome: GameOutcome },
    PayoutReceived { amount: Wei },
}

/// Wallet summary published after connecting and after every payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub address: Address,
    /// `None` when the balance read failed.
    pub balance: Option<Wei>,
    pub network: NetworkInfo,
}

/// Session lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected {
        epoch: u64,
        address: Address,
        network: NetworkInfo,
    },
    /// The wallet reported no accounts.
    Disconnected,
    /// Identity or network changed; the session is being rebuilt.
    Reinitializing { epoch: u64 },
    /// The session could not be started.
    Fatal { reason: String },
}
