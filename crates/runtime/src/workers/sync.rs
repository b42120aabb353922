//! Sync worker that owns the [`Session`] and drives every refresh.
//!
//! Remote calls never run inline in the loop. Each refresh, action or timer
//! becomes a future in a [`FuturesUnordered`] set, tagged with the session
//! epoch it started in, and its outcome is applied when it completes. Nothing
//! in flight is cancelled; the latest completion wins and outcomes from an
//! older epoch are dropped.
use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{EnvironmentChange, TxReceipt, WalletProvider};
use futures::future::BoxFuture;
use futures::stream::{BoxStream, FuturesUnordered};
use futures::{FutureExt, StreamExt};
use game_core::{GameAction, GameOutcome, GameSnapshot, GameStatus};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Interval};
use tracing::{debug, error, info, warn};

use crate::actions::{ActionLifecycleController, FollowUp, Reaction};
use crate::api::{Result, RuntimeError, SessionInfo};
use crate::client::RemoteStateClient;
use crate::events::{Event, EventBus, SessionEvent, SnapshotEvent, StatusEvent, WalletSnapshot};
use crate::reconciler::StateReconciler;
use crate::session::Session;
use crate::subscription::{GameEvent, GameEventStream};

/// Commands that can be sent to the sync worker
pub(crate) enum Command {
    /// Initialize (or re-initialize) the session.
    Connect {
        reply: oneshot::Sender<Result<SessionInfo>>,
    },
    /// Start an action flow.
    Perform {
        action: GameAction,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Full refresh on demand.
    Refresh,
    /// Query the current snapshot (read-only).
    QuerySnapshot {
        reply: oneshot::Sender<Option<Arc<GameSnapshot>>>,
    },
    Shutdown,
}

/// What caused a refresh; only used for logging.
#[derive(Debug, Clone, Copy, strum::Display)]
#[strum(serialize_all = "snake_case")]
enum RefreshTrigger {
    Session,
    Event,
    Action,
    Timer,
    Manual,
    FollowUp,
}

/// Result of a background task, tagged with the epoch it started in.
enum TaskOutcome {
    Refreshed {
        epoch: u64,
        trigger: RefreshTrigger,
        result: Result<GameSnapshot>,
    },
    StatusRead {
        epoch: u64,
        result: Result<(GameStatus, GameOutcome)>,
    },
    WalletRead {
        epoch: u64,
        wallet: WalletSnapshot,
    },
    ActionFinished {
        epoch: u64,
        action: GameAction,
        result: Result<TxReceipt>,
    },
}

pub(crate) struct SyncWorker {
    session: Session,
    client: RemoteStateClient,
    controller: ActionLifecycleController,
    wallet: Arc<dyn WalletProvider>,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    events: Option<GameEventStream>,
    environment: Option<BoxStream<'static, EnvironmentChange>>,
    interval: Option<Interval>,
    tasks: FuturesUnordered<BoxFuture<'static, TaskOutcome>>,
}

impl SyncWorker {
    pub(crate) fn new(
        session: Session,
        client: RemoteStateClient,
        controller: ActionLifecycleController,
        wallet: Arc<dyn WalletProvider>,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        interval: Option<Interval>,
    ) -> Self {
        let environment = Some(wallet.environment_changes());

        Self {
            session,
            client,
            controller,
            wallet,
            command_rx,
            event_bus,
            events: None,
            environment,
            interval,
            tasks: FuturesUnordered::new(),
        }
    }

    /// Main worker loop.
    pub(crate) async fn run(mut self) {
        info!(
            contract = %self.client.contract_address(),
            periodic_refresh = self.interval.is_some(),
            "SyncWorker started"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(Command::Shutdown) => {
                        info!("Shutdown command received");
                        break;
                    }
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                },
                event = next_item(&mut self.events) => match event {
                    Some(event) => self.handle_game_event(event),
                    None => {
                        warn!(epoch = self.session.epoch(), "log subscription ended");
                        self.events = None;
                    }
                },
                change = next_item(&mut self.environment) => match change {
                    Some(change) => self.handle_environment_change(change).await,
                    None => {
                        debug!("environment change stream ended");
                        self.environment = None;
                    }
                },
                Some(outcome) = self.tasks.next(), if !self.tasks.is_empty() => {
                    self.handle_outcome(outcome);
                }
                _ = next_tick(&mut self.interval) => {
                    if self.session.is_connected() {
                        self.schedule_refresh(RefreshTrigger::Timer, None);
                    }
                }
            }
        }

        self.session.teardown();
        info!("SyncWorker stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { reply } => {
                let result = self.connect().await;
                if reply.send(result).is_err() {
                    debug!("Connect reply channel closed (caller dropped)");
                }
            }
            Command::Perform { action, reply } => {
                let result = self.perform(action);
                if reply.send(result).is_err() {
                    debug!("Perform reply channel closed (caller dropped)");
                }
            }
            Command::Refresh => {
                if self.session.is_connected() {
                    self.schedule_refresh(RefreshTrigger::Manual, None);
                } else {
                    debug!("refresh requested without a session");
                }
            }
            Command::QuerySnapshot { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!("QuerySnapshot reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => {}
        }
    }

    async fn connect(&mut self) -> Result<SessionInfo> {
        if self.session.is_connected() {
            self.teardown();
        }

        match self.session.initialize(self.wallet.as_ref()).await {
            Ok((info, events)) => {
                self.events = Some(events);
                self.publish(Event::Session(SessionEvent::Connected {
                    epoch: info.epoch,
                    address: info.address,
                    network: info.network.clone(),
                }));
                self.schedule_refresh(RefreshTrigger::Session, None);
                self.schedule_wallet_refresh();
                Ok(info)
            }
            Err(e) => {
                error!(error = %e, "session could not be started");
                self.events = None;
                self.publish(Event::Session(SessionEvent::Fatal {
                    reason: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    fn perform(&mut self, action: GameAction) -> Result<()> {
        if !self.session.is_connected() {
            return Err(RuntimeError::NotConnected);
        }

        let notice = self.controller.begin(&action);
        self.publish(Event::Status(notice));

        let epoch = self.session.epoch();
        let flow = self.controller.execute(action);
        self.tasks.push(
            async move {
                let result = flow.await;
                TaskOutcome::ActionFinished {
                    epoch,
                    action,
                    result,
                }
            }
            .boxed(),
        );
        Ok(())
    }

    fn handle_game_event(&mut self, event: GameEvent) {
        debug!(?event, "remote event");
        let reaction = self.controller.on_event(&event);
        self.react(reaction, RefreshTrigger::Event);
    }

    async fn handle_environment_change(&mut self, change: EnvironmentChange) {
        match change {
            EnvironmentChange::AccountsChanged(accounts) if accounts.is_empty() => {
                info!("wallet reported no accounts");
                self.teardown();
                self.publish(Event::Session(SessionEvent::Disconnected));
            }
            EnvironmentChange::AccountsChanged(accounts) => {
                info!(account = %accounts[0], "accounts changed, re-initializing session");
                self.reinitialize().await;
            }
            EnvironmentChange::ChainChanged(network) => {
                info!(chain_id = network.chain_id, network = %network.name, "chain changed, re-initializing session");
                self.reinitialize().await;
            }
        }
    }

    async fn reinitialize(&mut self) {
        self.teardown();
        self.publish(Event::Session(SessionEvent::Reinitializing {
            epoch: self.session.epoch(),
        }));
        // Failures were already published as `SessionEvent::Fatal`.
        let _ = self.connect().await;
    }

    fn teardown(&mut self) {
        self.session.teardown();
        self.events = None;
        self.publish(Event::Snapshot(SnapshotEvent::Cleared));
    }

    fn handle_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Refreshed {
                epoch,
                trigger,
                result,
            } => match result {
                Ok(snapshot) => match self.session.apply(epoch, snapshot) {
                    Some(snapshot) => {
                        debug!(
                            epoch,
                            %trigger,
                            status = %snapshot.status,
                            player_cards = snapshot.player_cards.len(),
                            "snapshot applied"
                        );
                        self.publish(Event::Snapshot(SnapshotEvent::Applied { epoch, snapshot }));
                    }
                    None => debug!(epoch, %trigger, "stale refresh discarded"),
                },
                Err(e) => warn!(epoch, %trigger, error = %e, "refresh abandoned"),
            },
            TaskOutcome::StatusRead { epoch, result } => {
                if !self.session.accepts(epoch) {
                    debug!(epoch, "stale status read discarded");
                    return;
                }
                match result {
                    Ok((status, outcome)) => {
                        self.publish(Event::Status(StatusEvent::Restore { status, outcome }));
                    }
                    Err(e) => warn!(epoch, error = %e, "status fallback read failed"),
                }
            }
            TaskOutcome::WalletRead { epoch, wallet } => {
                if self.session.accepts(epoch) {
                    self.publish(Event::Wallet(wallet));
                } else {
                    debug!(epoch, "stale wallet read discarded");
                }
            }
            TaskOutcome::ActionFinished {
                epoch,
                action,
                result,
            } => {
                if !self.session.accepts(epoch) {
                    debug!(epoch, action = %action.kind(), "action settled after session change");
                    return;
                }
                let reaction = self.controller.complete(&action, &result);
                self.react(reaction, RefreshTrigger::Action);
            }
        }
    }

    fn react(&mut self, reaction: Reaction, trigger: RefreshTrigger) {
        for status in reaction.status {
            self.publish(Event::Status(status));
        }
        for follow_up in reaction.follow_ups {
            match follow_up {
                FollowUp::Refresh => self.schedule_refresh(trigger, None),
                FollowUp::RefreshAfter(delay) => {
                    self.schedule_refresh(RefreshTrigger::FollowUp, Some(delay))
                }
                FollowUp::RestoreStatusAfter(delay) => self.schedule_status_restore(delay),
                FollowUp::RefreshWallet => self.schedule_wallet_refresh(),
            }
        }
    }

    fn schedule_refresh(&mut self, trigger: RefreshTrigger, delay: Option<Duration>) {
        let client = self.client.clone();
        let epoch = self.session.epoch();

        self.tasks.push(
            async move {
                if let Some(delay) = delay {
                    time::sleep(delay).await;
                }
                let result = fetch_snapshot(&client).await;
                TaskOutcome::Refreshed {
                    epoch,
                    trigger,
                    result,
                }
            }
            .boxed(),
        );
    }

    fn schedule_status_restore(&mut self, delay: Duration) {
        let client = self.client.clone();
        let epoch = self.session.epoch();

        self.tasks.push(
            async move {
                time::sleep(delay).await;
                let result = fetch_status(&client).await;
                TaskOutcome::StatusRead { epoch, result }
            }
            .boxed(),
        );
    }

    fn schedule_wallet_refresh(&mut self) {
        let (Some(address), Some(network)) = (self.session.identity(), self.session.network())
        else {
            return;
        };
        let network = network.clone();
        let wallet = Arc::clone(&self.wallet);
        let epoch = self.session.epoch();

        self.tasks.push(
            async move {
                let balance = match wallet.balance(&address).await {
                    Ok(balance) => Some(balance),
                    Err(e) => {
                        warn!(%address, error = %e, "balance read failed");
                        None
                    }
                };
                TaskOutcome::WalletRead {
                    epoch,
                    wallet: WalletSnapshot {
                        address,
                        balance,
                        network,
                    },
                }
            }
            .boxed(),
        );
    }

    fn publish(&self, event: Event) {
        self.event_bus.publish(event);
    }
}

async fn fetch_snapshot(client: &RemoteStateClient) -> Result<GameSnapshot> {
    let raw = client.read_snapshot().await?;
    Ok(StateReconciler::reconcile(raw)?)
}

async fn fetch_status(client: &RemoteStateClient) -> Result<(GameStatus, GameOutcome)> {
    let (state, result) = client.read_status().await?;
    Ok(StateReconciler::status(&state, &result))
}

/// Next item of an optional stream; pending forever when there is none.
async fn next_item<T>(stream: &mut Option<BoxStream<'static, T>>) -> Option<T> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
