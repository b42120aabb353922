//! Synchronization engine between the local client and the remote blackjack
//! authority.
//!
//! This crate mirrors a game whose canonical state lives entirely in a remote
//! contract. Consumers embed [`Runtime`] to keep an immutable
//! [`game_core::GameSnapshot`] up to date, issue actions, and subscribe to
//! events through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator, builder and configuration
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`subscription`], [`client`] and [`reconciler`] talk to the authority
//! - [`actions`] sequences user actions through submit, confirm and refresh
//! - [`session`] owns the per-identity context that is torn down on change
//! - [`workers`] keeps the driver loop internal to the crate
pub mod actions;
pub mod api;
pub mod client;
pub mod events;
pub mod reconciler;
pub mod runtime;
pub mod session;
pub mod subscription;

mod workers;

pub use actions::{ActionLifecycleController, FollowUp};
pub use api::{ErrorSeverity, Result, RuntimeError, RuntimeHandle, SessionInfo};
pub use client::{RawSnapshot, RemoteStateClient};
pub use events::{
    Event, EventBus, Notice, SessionEvent, SnapshotEvent, StatusEvent, Topic, WalletSnapshot,
};
pub use reconciler::{ReconcileError, StateReconciler};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::Session;
pub use subscription::{EventSubscriptionManager, GameEvent, GameEventStream};
