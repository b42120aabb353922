//! Player-initiated actions forwarded to the authority.
use crate::units::Wei;

/// Action identifiers, parsed from user input and used as log labels.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    Start,
    Hit,
    Stand,
    Payout,
    Reset,
}

/// A write against the authority, with its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameAction {
    /// Start a round, attaching the stake (in wei) as the call value.
    Start { stake: Wei },
    Hit,
    Stand,
    ClaimPayout,
    Reset,
}

impl GameAction {
    pub const fn kind(&self) -> ActionKind {
        match self {
            GameAction::Start { .. } => ActionKind::Start,
            GameAction::Hit => ActionKind::Hit,
            GameAction::Stand => ActionKind::Stand,
            GameAction::ClaimPayout => ActionKind::Payout,
            GameAction::Reset => ActionKind::Reset,
        }
    }
}
