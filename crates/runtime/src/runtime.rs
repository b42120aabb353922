//! High-level runtime orchestrator.
//!
//! The runtime owns the sync worker, wires up command/event channels, and
//! exposes a builder-based API for clients to mirror the remote game.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{GameContract, WalletProvider};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::actions::ActionLifecycleController;
use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::client::RemoteStateClient;
use crate::events::{Event, EventBus, Topic};
use crate::session::Session;
use crate::workers::{Command, SyncWorker};

/// Runtime configuration shared across the orchestrator and the worker.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Delay before the status line is restored after a failed action.
    pub error_fallback: Duration,
    /// Delay of the extra refresh after a bust advisory.
    pub bust_follow_up: Duration,
    /// Periodic refresh; disabled when `None`.
    pub refresh_interval: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 16,
            error_fallback: Duration::from_millis(3000),
            bust_follow_up: Duration::from_millis(1000),
            refresh_interval: None,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BLACKJACK_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `BLACKJACK_COMMAND_BUFFER` - Command queue size (default: 16)
    /// - `BLACKJACK_ERROR_FALLBACK_MS` - Status restore delay after a failure (default: 3000)
    /// - `BLACKJACK_BUST_FOLLOWUP_MS` - Refresh delay after a bust advisory (default: 1000)
    /// - `BLACKJACK_REFRESH_INTERVAL_MS` - Periodic refresh (default: disabled, 0 disables)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("BLACKJACK_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BLACKJACK_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(ms) = read_env::<u64>("BLACKJACK_ERROR_FALLBACK_MS") {
            config.error_fallback = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BLACKJACK_BUST_FOLLOWUP_MS") {
            config.bust_follow_up = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("BLACKJACK_REFRESH_INTERVAL_MS") {
            config.refresh_interval = (ms > 0).then(|| Duration::from_millis(ms));
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

/// Main runtime that keeps the local view in sync with the authority
///
/// Design: Runtime owns the worker task.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events of one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Tears down the session and waits for the worker to exit. In-flight
    /// remote calls are dropped with it.
    pub async fn shutdown(self) -> Result<()> {
        // The worker may already have stopped if every handle was dropped.
        let _ = self.handle.shutdown().await;
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    contract: Option<Arc<dyn GameContract>>,
    wallet: Option<Arc<dyn WalletProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            contract: None,
            wallet: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the remote game authority (required)
    pub fn contract(mut self, contract: Arc<dyn GameContract>) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Set the hosting wallet (required)
    pub fn wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// The session is not started yet; call [`RuntimeHandle::connect`] once
    /// the consumer has subscribed to the topics it needs.
    pub async fn build(self) -> Result<Runtime> {
        let contract = self
            .contract
            .ok_or(RuntimeError::MissingCollaborator("contract"))?;
        let wallet = self
            .wallet
            .ok_or(RuntimeError::MissingCollaborator("wallet provider"))?;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let client = RemoteStateClient::new(Arc::clone(&contract));
        let controller = ActionLifecycleController::new(
            client.clone(),
            self.config.error_fallback,
            self.config.bust_follow_up,
        );

        let interval = self.config.refresh_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        let worker = SyncWorker::new(
            Session::new(contract),
            client,
            controller,
            wallet,
            command_rx,
            event_bus,
            interval,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.event_buffer_size, 100);
        assert_eq!(config.command_buffer_size, 16);
        assert_eq!(config.error_fallback, Duration::from_secs(3));
        assert_eq!(config.bust_follow_up, Duration::from_secs(1));
        assert!(config.refresh_interval.is_none());
    }

    #[tokio::test]
    async fn build_requires_contract_and_wallet() {
        let err = Runtime::builder().build().await.err().unwrap();
        assert!(matches!(err, RuntimeError::MissingCollaborator("contract")));
    }
}
