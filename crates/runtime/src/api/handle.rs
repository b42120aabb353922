//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! connecting, performing actions, or streaming events from specific topics.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{Address, GameAction, GameSnapshot, NetworkInfo};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Identity and network of a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub epoch: u64,
    pub address: Address,
    pub network: NetworkInfo,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Start (or restart) the session against the current wallet.
    ///
    /// Fails with [`RuntimeError::NoProvider`] when no provider or account is
    /// reachable. Subscribe to topics before calling this to see the events it
    /// publishes.
    pub async fn connect(&self) -> Result<SessionInfo> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Connect { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Start an action flow.
    ///
    /// Returns once the flow is accepted; its progress arrives on
    /// [`Topic::Status`]. Actions are not serialized, so callers should only
    /// offer actions from the current derived action set.
    pub async fn perform(&self, action: GameAction) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Perform {
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Request a full refresh.
    pub async fn refresh(&self) -> Result<()> {
        self.command_tx
            .send(Command::Refresh)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Query the current snapshot, if any.
    pub async fn snapshot(&self) -> Result<Option<Arc<GameSnapshot>>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::QuerySnapshot { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Snapshot` - Snapshot replacements and clears
    /// - `Topic::Status` - Notices, action failures, bust advisories
    /// - `Topic::Wallet` - Wallet summary
    /// - `Topic::Session` - Connect, disconnect and fatal errors
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
