//! Frontend-side state assembled from runtime events.
//!
//! [`ScreenState`] keeps the latest snapshot, wallet summary and transient
//! messages, and renders them into a [`Frame`] on demand.
use std::sync::Arc;
use std::time::{Duration, Instant};

use game_core::{Address, GameSnapshot};
use runtime::{Event, SessionEvent, SnapshotEvent, StatusEvent, WalletSnapshot};

use crate::config::MessageConfig;
use crate::event::{EventConsumer, EventImpact};
use crate::format;
use crate::message::{MessageEntry, MessageLevel, MessageLog};
use crate::view_model::{ActionSet, GameView, StatusLine, StatusTone, ViewModelDeriver};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletView {
    pub address: String,
    /// `?` when the balance could not be read.
    pub balance: String,
    pub network: String,
}

impl WalletView {
    pub fn from_snapshot(wallet: &WalletSnapshot) -> Self {
        Self {
            address: format::short_address(&wallet.address),
            balance: wallet
                .balance
                .map(format::balance)
                .unwrap_or_else(|| "?".to_string()),
            network: format::network_line(&wallet.network),
        }
    }
}

/// One renderable screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Persistent banner for a session that could not start.
    pub fatal: Option<String>,
    pub wallet: Option<WalletView>,
    pub game: Option<GameView>,
    pub status: StatusLine,
    pub notice: Option<String>,
    pub actions: ActionSet,
}

pub struct ScreenState {
    identity: Option<Address>,
    snapshot: Option<Arc<GameSnapshot>>,
    wallet: Option<WalletSnapshot>,
    status_override: Option<StatusLine>,
    notice: Option<(String, Instant)>,
    fatal: Option<String>,
    connected: bool,
    messages: MessageLog,
    notice_ttl: Duration,
}

impl ScreenState {
    pub fn new(config: &MessageConfig) -> Self {
        Self {
            identity: None,
            snapshot: None,
            wallet: None,
            status_override: None,
            notice: None,
            fatal: None,
            connected: false,
            messages: MessageLog::new(config.capacity),
            notice_ttl: config.notice_ttl,
        }
    }

    pub fn apply_at(&mut self, event: &Event, now: Instant) -> EventImpact {
        match event {
            Event::Snapshot(SnapshotEvent::Applied { snapshot, .. }) => {
                self.snapshot = Some(Arc::clone(snapshot));
                // Authoritative state supersedes errors and advisories.
                self.status_override = None;
                EventImpact::redraw()
            }
            Event::Snapshot(SnapshotEvent::Cleared) => {
                self.snapshot = None;
                self.status_override = None;
                EventImpact::redraw()
            }
            Event::Status(status) => self.apply_status(status, now),
            Event::Wallet(wallet) => {
                self.wallet = Some(wallet.clone());
                EventImpact::redraw()
            }
            Event::Session(session) => {
                self.apply_session(session, now);
                EventImpact::redraw()
            }
        }
    }

    fn apply_status(&mut self, status: &StatusEvent, now: Instant) -> EventImpact {
        match status {
            StatusEvent::Notice(notice) => {
                let entries = format::notice_messages(notice);
                let Some(last) = entries.last() else {
                    return EventImpact::none();
                };
                self.notice = Some((last.text.clone(), now + self.notice_ttl));
                for entry in entries {
                    self.messages.push(entry);
                }
            }
            StatusEvent::ActionFailed { action, reason } => {
                let text = format::failure_text(*action, reason);
                self.status_override = Some(StatusLine::new(
                    format::error_status(&text),
                    StatusTone::Error,
                ));
                self.show(MessageEntry::new(text, MessageLevel::Error), now);
            }
            StatusEvent::BustAdvisory { .. } => {
                self.status_override = Some(StatusLine::new(format::BUST_ADVISORY, StatusTone::Lose));
                self.show(
                    MessageEntry::new(format::BUST_ADVISORY, MessageLevel::Warning),
                    now,
                );
            }
            StatusEvent::Restore { status, outcome } => {
                self.status_override = Some(ViewModelDeriver::status_line(*status, *outcome));
            }
        }
        EventImpact::redraw()
    }

    fn apply_session(&mut self, session: &SessionEvent, now: Instant) {
        match session {
            SessionEvent::Connected { address, .. } => {
                self.identity = Some(*address);
                self.connected = true;
                self.fatal = None;
                self.status_override = None;
                self.messages
                    .push_text(format!("Connected as {}", format::short_address(address)));
            }
            SessionEvent::Disconnected => {
                self.identity = None;
                self.connected = false;
                self.snapshot = None;
                self.wallet = None;
                self.status_override = Some(StatusLine::new(format::DISCONNECTED, StatusTone::Neutral));
                self.show(MessageEntry::new(format::DISCONNECTED, MessageLevel::Warning), now);
            }
            SessionEvent::Reinitializing { .. } => {
                self.snapshot = None;
                self.wallet = None;
                self.messages.push_text("Wallet changed, reloading...");
            }
            SessionEvent::Fatal { reason } => {
                self.connected = false;
                self.identity = None;
                self.fatal = Some(format!("⚠️ {reason}"));
                self.messages
                    .push(MessageEntry::new(reason.clone(), MessageLevel::Error));
            }
        }
    }

    fn show(&mut self, entry: MessageEntry, now: Instant) {
        self.notice = Some((entry.text.clone(), now + self.notice_ttl));
        self.messages.push(entry);
    }

    pub fn frame_at(&self, now: Instant) -> Frame {
        let game = self
            .snapshot
            .as_deref()
            .map(|snapshot| ViewModelDeriver::derive(snapshot, self.identity.as_ref()));

        let status = match (&self.status_override, &game) {
            (Some(line), _) => line.clone(),
            (None, Some(view)) => view.status.clone(),
            (None, None) if self.connected => {
                StatusLine::new("Loading game state...", StatusTone::Waiting)
            }
            (None, None) => StatusLine::new(format::DISCONNECTED, StatusTone::Neutral),
        };

        let notice = self
            .notice
            .as_ref()
            .filter(|(_, expires)| *expires > now)
            .map(|(text, _)| text.clone());

        Frame {
            fatal: self.fatal.clone(),
            wallet: self.wallet.as_ref().map(WalletView::from_snapshot),
            actions: game.as_ref().map_or(ActionSet::empty(), |view| view.actions),
            game,
            status,
            notice,
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame_at(Instant::now())
    }

    /// Actions the player may take right now.
    pub fn actions(&self) -> ActionSet {
        match (&self.snapshot, self.connected) {
            (Some(snapshot), true) => {
                ViewModelDeriver::enabled_actions(snapshot, self.identity.as_ref())
            }
            _ => ActionSet::empty(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl EventConsumer for ScreenState {
    fn on_event(&mut self, event: &Event) -> EventImpact {
        self.apply_at(event, Instant::now())
    }

    fn message_log(&self) -> &MessageLog {
        &self.messages
    }
}
