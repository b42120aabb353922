//! Remote authority abstraction for the blackjack client.
//!
//! The authoritative game lives in a ledger-resident contract. This crate
//! describes everything the client may do with it, without committing to a
//! wallet, transport or signing stack.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: GameContract (composite trait)
//!          ├── ContractReader   (idempotent reads, concurrent-safe)
//!          ├── ContractWriter   (two-phase submit → confirm)
//!          └── EventSource      (push notifications)
//!
//! Host:    WalletProvider (identity, network, balance, environment changes)
//! ```
//!
//! Values cross this boundary in the contract's native form ([`Word`],
//! [`RawLog`]); conversion into local numerics happens in the runtime.
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{ContractWriter, GameContract};
//!
//! async fn hit(contract: &dyn GameContract) -> Result<(), WriteError> {
//!     let pending = contract.submit(GameAction::Hit).await?;
//!     let receipt = contract.confirm(&pending).await?;
//!     tracing::info!("hit mined in block {}", receipt.block_number);
//!     Ok(())
//! }
//! ```

pub mod events;
pub mod traits;
pub mod types;

#[cfg(feature = "mock")]
pub mod mock;

pub use events::{EventKind, LogSubscription, LogValue, RawLog, SubscriptionId};
pub use traits::{
    ContractReader, ContractWriter, EnvironmentChange, EventSource, GameContract, ReadError,
    TransportError, WalletProvider, WriteError,
};
pub use types::{PendingTx, TxHash, TxReceipt, Word, method_name};

#[cfg(feature = "mock")]
pub use mock::MockBlackjack;
