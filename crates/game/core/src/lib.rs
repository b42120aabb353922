//! Mirrored blackjack vocabulary shared across clients.
//!
//! `game-core` defines the types the client uses to describe a hand that is
//! owned by the remote authority: cards and their display names, the game
//! status and outcome codes, the immutable [`GameSnapshot`], player identity,
//! and ether unit conversion for stakes. It deliberately contains no dealing,
//! scoring or win determination.
pub mod actions;
pub mod card;
pub mod identity;
pub mod snapshot;
pub mod units;

pub use actions::{ActionKind, GameAction};
pub use card::{Card, CardColor};
pub use identity::{Address, AddressError, NetworkInfo};
pub use snapshot::{BUST_THRESHOLD, GameOutcome, GameSnapshot, GameStatus};
pub use units::{ETHER_DECIMALS, UnitsError, WEI_PER_ETHER, Wei, format_ether, parse_ether};
