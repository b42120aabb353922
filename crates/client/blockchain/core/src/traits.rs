//! Contract and wallet abstraction traits.
//!
//! This module defines the contract surface the client depends on:
//! - ContractReader: six scalar getters and two array getters
//! - ContractWriter: two-phase writes (submit, then confirm)
//! - EventSource: push notifications on the game channel
//! - WalletProvider: the hosting wallet (identity, network, balance)

use async_trait::async_trait;
use futures::stream::BoxStream;
use game_core::{Address, GameAction, NetworkInfo, Wei};

use crate::events::{LogSubscription, SubscriptionId};
use crate::types::{PendingTx, TxHash, TxReceipt, Word};

// ============================================================================
// Error Types
// ============================================================================

/// Transport layer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("no wallet provider available")]
    ProviderUnavailable,

    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),
}

/// Failures of an idempotent read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("call to {method} failed: {reason}")]
    CallFailed { method: &'static str, reason: String },
}

/// Failures of a two-phase write.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("transaction {hash} reverted: {reason}")]
    Reverted { hash: TxHash, reason: String },

    #[error("unknown pending transaction {0}")]
    UnknownTransaction(TxHash),
}

// ============================================================================
// Contract Surface
// ============================================================================

/// Idempotent view calls. Safe to issue concurrently.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// `gameState() returns (uint8)`
    async fn game_state(&self) -> Result<Word, ReadError>;

    /// `gameResult() returns (uint8)`
    async fn game_result(&self) -> Result<Word, ReadError>;

    async fn player_score(&self) -> Result<Word, ReadError>;

    async fn dealer_score(&self) -> Result<Word, ReadError>;

    /// Current stake in wei.
    async fn bet(&self) -> Result<Word, ReadError>;

    /// Player recorded for the current round.
    async fn player(&self) -> Result<Address, ReadError>;

    async fn player_cards(&self) -> Result<Vec<Word>, ReadError>;

    async fn dealer_cards(&self) -> Result<Vec<Word>, ReadError>;
}

/// Mutating entry points, each a submit/confirm pair.
#[async_trait]
pub trait ContractWriter: Send + Sync {
    /// Sign and broadcast. The returned handle is not yet applied.
    async fn submit(&self, action: GameAction) -> Result<PendingTx, WriteError>;

    /// Suspend until the transaction is final. No local timeout.
    async fn confirm(&self, pending: &PendingTx) -> Result<TxReceipt, WriteError>;
}

/// Push notifications emitted by the contract.
pub trait EventSource: Send + Sync {
    /// Subscribe to every game event on the contract.
    fn subscribe(&self) -> Result<LogSubscription, TransportError>;

    /// Remove a subscription. Its stream ends afterwards.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Complete contract interface the runtime works against.
pub trait GameContract: ContractReader + ContractWriter + EventSource + Send + Sync {
    /// Deployed contract address.
    fn address(&self) -> Address;
}

// ============================================================================
// Hosting Wallet
// ============================================================================

/// Identity or network change notified by the hosting wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentChange {
    /// An empty list means the wallet was locked or disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(NetworkInfo),
}

/// Wallet the client is embedded in.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Verify a provider is reachable at all.
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Unlocked accounts; the first one is the active identity.
    async fn accounts(&self) -> Result<Vec<Address>, TransportError>;

    async fn network(&self) -> Result<NetworkInfo, TransportError>;

    async fn balance(&self, address: &Address) -> Result<Wei, TransportError>;

    /// Stream of identity/network changes for the lifetime of the provider.
    fn environment_changes(&self) -> BoxStream<'static, EnvironmentChange>;
}
