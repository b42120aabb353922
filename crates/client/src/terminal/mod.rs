//! Line-oriented terminal frontend.
//!
//! Reads one command per line from stdin and redraws the table whenever a
//! runtime event changes what is on screen. Action commands are gated on the
//! action set derived from the latest snapshot.
mod input;
mod render;

pub use input::{HELP, Input, InputError};
pub use render::{action_list, render};

use anyhow::Result;
use async_trait::async_trait;
use client_frontend_core::{EventConsumer, Frontend, FrontendConfig, ScreenState};
use game_core::{ActionKind, GameAction, NetworkInfo, parse_ether};
use runtime::{Event, RuntimeHandle, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use crate::demo::DemoAuthority;

/// Whether the input loop keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct TerminalFrontend {
    config: FrontendConfig,
    demo: DemoAuthority,
    screen: ScreenState,
}

impl TerminalFrontend {
    pub fn new(config: FrontendConfig, demo: DemoAuthority) -> Self {
        let screen = ScreenState::new(&config.messages);
        Self {
            config,
            demo,
            screen,
        }
    }

    fn draw(&self) {
        print!("{}", render(&self.screen.frame()));
    }

    fn on_runtime_events(&mut self, events: &[Event]) {
        if self.screen.on_events(events).requires_redraw {
            self.draw();
        }
    }

    async fn handle_line(&mut self, line: &str, handle: &RuntimeHandle) -> Result<Flow> {
        let input = match line.parse::<Input>() {
            Ok(input) => input,
            Err(err) => {
                println!("{err}");
                return Ok(Flow::Continue);
            }
        };

        match input {
            Input::Empty => self.draw(),
            Input::Help => println!("{HELP}"),
            Input::Quit => return Ok(Flow::Quit),
            Input::Action { kind, stake } => self.submit(kind, stake, handle).await?,
            Input::Refresh => handle.refresh().await?,
            Input::Account(n) => match self.demo.select_account(n - 1) {
                Some(account) => println!("Switching to {}", account.short()),
                None => println!("Only {} accounts available", self.demo.accounts().len()),
            },
            Input::Chain { chain_id, name } => {
                self.demo.switch_chain(NetworkInfo::new(name, chain_id));
            }
            Input::Disconnect => self.demo.disconnect(),
            Input::Connect => {
                // An unlocked wallet notifies the runtime, which reconnects.
                if self.screen.is_connected() {
                    println!("Already connected");
                } else {
                    self.demo.connect();
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn submit(
        &mut self,
        kind: ActionKind,
        stake: Option<String>,
        handle: &RuntimeHandle,
    ) -> Result<()> {
        let allowed = self.screen.actions();
        if !allowed.allows(kind) {
            println!(
                "`{kind}` is not available right now. Available: {}",
                action_list(allowed)
            );
            return Ok(());
        }

        let action = match kind {
            ActionKind::Start => {
                let text = stake.unwrap_or_else(|| self.config.default_stake.clone());
                match parse_ether(&text) {
                    Ok(stake) if stake > 0 => GameAction::Start { stake },
                    Ok(_) => {
                        println!("Stake must be greater than zero");
                        return Ok(());
                    }
                    Err(err) => {
                        println!("Invalid stake `{text}`: {err}");
                        return Ok(());
                    }
                }
            }
            ActionKind::Hit => GameAction::Hit,
            ActionKind::Stand => GameAction::Stand,
            ActionKind::Payout => GameAction::ClaimPayout,
            ActionKind::Reset => GameAction::Reset,
        };

        if let Err(err) = handle.perform(action).await {
            if err.is_fatal() {
                return Err(err.into());
            }
            println!("{err}");
        }
        Ok(())
    }
}

#[async_trait]
impl Frontend for TerminalFrontend {
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()> {
        let mut receivers = handle.subscribe_multiple(&Topic::ALL);
        let mut snapshots = take(&mut receivers, Topic::Snapshot, &handle);
        let mut status = take(&mut receivers, Topic::Status, &handle);
        let mut wallet = take(&mut receivers, Topic::Wallet, &handle);
        let mut session = take(&mut receivers, Topic::Session, &handle);

        println!("{HELP}");
        if let Err(err) = handle.connect().await {
            // The Fatal session event carries the message to the screen.
            tracing::warn!("Initial connect failed: {}", err);
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let event = tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if self.handle_line(&line, &handle).await? == Flow::Quit {
                                break;
                            }
                            continue;
                        }
                        None => break,
                    }
                }
                event = next_event(&mut snapshots) => event,
                event = next_event(&mut status) => event,
                event = next_event(&mut wallet) => event,
                event = next_event(&mut session) => event,
            };

            match event {
                Some(event) => {
                    // Fold whatever else is already queued into the same redraw.
                    let mut batch = vec![event];
                    for rx in [&mut snapshots, &mut status, &mut wallet, &mut session] {
                        batch.extend(queued_events(rx));
                    }
                    self.on_runtime_events(&batch);
                }
                None => {
                    tracing::info!("Runtime event bus closed");
                    break;
                }
            }
        }

        tracing::info!(
            messages = self.screen.message_log().len(),
            "Terminal frontend exiting"
        );
        Ok(())
    }
}

fn take(
    receivers: &mut std::collections::HashMap<Topic, broadcast::Receiver<Event>>,
    topic: Topic,
    handle: &RuntimeHandle,
) -> broadcast::Receiver<Event> {
    receivers
        .remove(&topic)
        .unwrap_or_else(|| handle.subscribe(topic))
}

/// Events already waiting on a topic, without blocking.
fn queued_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Terminal frontend lagged behind runtime events");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
        }
    }
}

/// Next event on a topic; `None` once the bus is gone.
async fn next_event(rx: &mut broadcast::Receiver<Event>) -> Option<Event> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Terminal frontend lagged behind runtime events");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}
