//! Remote notification stream, normalized into [`GameEvent`]s.
//!
//! A subscription belongs to one session. It is never renewed on its own:
//! when identity or network changes the session tears it down and opens a new
//! one. Payloads that do not match the expected shape are surfaced as
//! [`GameEvent::Malformed`] instead of ending the stream.
use std::sync::Arc;

use client_blockchain_core::{
    EventKind, GameContract, LogValue, RawLog, SubscriptionId, TransportError, Word,
};
use futures::StreamExt;
use futures::stream::BoxStream;
use game_core::{Address, Card, GameOutcome, Wei};
use tracing::{debug, warn};

/// Lazy, non-restartable stream of normalized events.
pub type GameEventStream = BoxStream<'static, GameEvent>;

/// A contract log converted to local types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Started { player: Address, bet: Wei },
    PlayerDraw { card: Card, total: u128 },
    DealerDraw { card: Card, total: u128 },
    Finished { player: Address, outcome: GameOutcome },
    Payout { player: Address, amount: Wei },
    /// Unknown event name or unexpected arguments.
    Malformed { event: String, reason: String },
}

impl GameEvent {
    /// Convert a raw log. Never fails; bad payloads become `Malformed`.
    pub fn normalize(log: &RawLog) -> Self {
        let Ok(kind) = log.event.parse::<EventKind>() else {
            return GameEvent::Malformed {
                event: log.event.clone(),
                reason: "unknown event".to_string(),
            };
        };

        match Self::decode(kind, &log.args) {
            Ok(event) => event,
            Err(reason) => GameEvent::Malformed {
                event: log.event.clone(),
                reason,
            },
        }
    }

    fn decode(kind: EventKind, args: &[LogValue]) -> Result<Self, String> {
        if args.len() != 2 {
            return Err(format!("expected 2 arguments, got {}", args.len()));
        }

        let event = match kind {
            EventKind::GameStarted => GameEvent::Started {
                player: address_arg(&args[0], "player")?,
                bet: uint_arg(&args[1], "bet")?,
            },
            EventKind::PlayerHit => GameEvent::PlayerDraw {
                card: card_arg(&args[0])?,
                total: uint_arg(&args[1], "total")?,
            },
            EventKind::DealerHit => GameEvent::DealerDraw {
                card: card_arg(&args[0])?,
                total: uint_arg(&args[1], "total")?,
            },
            EventKind::GameFinished => GameEvent::Finished {
                player: address_arg(&args[0], "player")?,
                outcome: GameOutcome::from_code(crate::reconciler::code(word_arg(&args[1], "result")?)),
            },
            EventKind::Payout => GameEvent::Payout {
                player: address_arg(&args[0], "player")?,
                amount: uint_arg(&args[1], "amount")?,
            },
        };
        Ok(event)
    }
}

fn address_arg(value: &LogValue, name: &str) -> Result<Address, String> {
    match value {
        LogValue::Address(address) => Ok(*address),
        LogValue::Uint(_) => Err(format!("{name}: expected address")),
    }
}

fn word_arg<'a>(value: &'a LogValue, name: &str) -> Result<&'a Word, String> {
    match value {
        LogValue::Uint(word) => Ok(word),
        LogValue::Address(_) => Err(format!("{name}: expected uint")),
    }
}

fn uint_arg(value: &LogValue, name: &str) -> Result<u128, String> {
    let word = word_arg(value, name)?;
    word.to_u128()
        .ok_or_else(|| format!("{name}: {word} does not fit in 128 bits"))
}

fn card_arg(value: &LogValue) -> Result<Card, String> {
    word_arg(value, "card").map(|word| Card::from_be_bytes(word.0))
}

/// Owns the live subscription of one session.
pub struct EventSubscriptionManager {
    contract: Arc<dyn GameContract>,
    active: Option<SubscriptionId>,
}

impl EventSubscriptionManager {
    pub fn new(contract: Arc<dyn GameContract>) -> Self {
        Self {
            contract,
            active: None,
        }
    }

    /// Open a subscription covering all five game events.
    ///
    /// Any previous subscription is torn down first.
    pub fn subscribe(&mut self) -> Result<GameEventStream, TransportError> {
        self.teardown();

        let subscription = self.contract.subscribe()?;
        debug!(id = subscription.id.0, "log subscription opened");
        self.active = Some(subscription.id);

        let events = subscription.logs.map(|log| {
            let event = GameEvent::normalize(&log);
            if let GameEvent::Malformed { event, reason } = &event {
                warn!(%event, %reason, block = log.block_number, "malformed log");
            }
            event
        });
        Ok(events.boxed())
    }

    pub fn teardown(&mut self) {
        if let Some(id) = self.active.take() {
            self.contract.unsubscribe(id);
            debug!(id = id.0, "log subscription closed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for EventSubscriptionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
