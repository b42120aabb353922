//! Raw contract logs as delivered by the notification stream.
use std::fmt;

use futures::stream::BoxStream;
use game_core::Address;

use crate::types::Word;

/// Events declared by the blackjack contract ABI.
///
/// String forms are the ABI event names, e.g. `"PlayerHit"`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum EventKind {
    /// `GameStarted(address indexed player, uint256 bet)`
    GameStarted,
    /// `PlayerHit(uint256 card, uint256 total)`
    PlayerHit,
    /// `DealerHit(uint256 card, uint256 total)`
    DealerHit,
    /// `GameFinished(address indexed player, uint8 result)`
    GameFinished,
    /// `Payout(address indexed player, uint256 amount)`
    Payout,
}

/// Decoded log argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogValue {
    Address(Address),
    Uint(Word),
}

/// One log entry. Argument order follows the ABI declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawLog {
    pub event: String,
    pub args: Vec<LogValue>,
    pub block_number: u64,
}

impl RawLog {
    pub fn new(kind: EventKind, args: Vec<LogValue>, block_number: u64) -> Self {
        Self {
            event: kind.to_string(),
            args,
            block_number,
        }
    }
}

/// Identifier of a live log subscription, used to tear it down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// A live log subscription.
///
/// The stream ends once the subscription is removed on the provider side and
/// is never restarted.
pub struct LogSubscription {
    pub id: SubscriptionId,
    pub logs: BoxStream<'static, RawLog>,
}

impl fmt::Debug for LogSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn event_names_match_abi() {
        let names: Vec<&'static str> = EventKind::iter().map(<&'static str>::from).collect();
        assert_eq!(
            names,
            ["GameStarted", "PlayerHit", "DealerHit", "GameFinished", "Payout"]
        );
        for kind in EventKind::iter() {
            assert_eq!(kind.to_string().parse::<EventKind>(), Ok(kind));
        }
        assert!("playerhit".parse::<EventKind>().is_err());
    }
}
