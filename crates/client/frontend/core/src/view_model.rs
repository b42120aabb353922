//! UI directives derived from a [`GameSnapshot`] and the local identity.
//!
//! Everything here is a pure function of its inputs: no I/O, no clocks. The
//! same snapshot and identity always produce the same view.
use bitflags::bitflags;
use game_core::{ActionKind, Address, Card, CardColor, GameOutcome, GameSnapshot, GameStatus};

use crate::format;

bitflags! {
    /// Actions a frontend may offer for the current snapshot.
    ///
    /// Actions are not serialized by the runtime, so this set is the only gate
    /// against overlapping flows.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActionSet: u8 {
        const START  = 1 << 0;
        const HIT    = 1 << 1;
        const STAND  = 1 << 2;
        const PAYOUT = 1 << 3;
        const RESET  = 1 << 4;
    }
}

impl ActionSet {
    pub const fn for_kind(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Start => Self::START,
            ActionKind::Hit => Self::HIT,
            ActionKind::Stand => Self::STAND,
            ActionKind::Payout => Self::PAYOUT,
            ActionKind::Reset => Self::RESET,
        }
    }

    pub fn allows(self, kind: ActionKind) -> bool {
        self.contains(Self::for_kind(kind))
    }
}

/// Presentation of one card slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardView {
    Hidden,
    Shown { name: String, color: CardColor },
}

impl CardView {
    fn shown(card: Card) -> Self {
        CardView::Shown {
            name: card.name().into_owned(),
            color: card.color(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CardView::Hidden => format::HIDDEN_CARD,
            CardView::Shown { name, .. } => name,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, CardView::Hidden)
    }
}

/// Visual weight of the status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StatusTone {
    Ready,
    Attention,
    Waiting,
    Win,
    Lose,
    Neutral,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, tone: StatusTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// End-of-round banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultBanner {
    pub text: String,
    pub tone: StatusTone,
    /// Shown when the local player can claim.
    pub claim_hint: Option<&'static str>,
}

/// Everything a frontend needs to draw the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameView {
    pub state_label: String,
    pub result_label: String,
    pub bet: String,
    pub player_cards: Vec<CardView>,
    pub dealer_cards: Vec<CardView>,
    pub player_score: u128,
    /// `None` while the hole card is hidden.
    pub dealer_score: Option<u128>,
    pub status: StatusLine,
    pub banner: Option<ResultBanner>,
    pub actions: ActionSet,
}

pub const CLAIM_HINT: &str = "Claim your winnings!";

/// Stateless snapshot-to-view derivation.
pub struct ViewModelDeriver;

impl ViewModelDeriver {
    pub fn derive(snapshot: &GameSnapshot, identity: Option<&Address>) -> GameView {
        let hidden = Self::hides_hole_card(snapshot.status);
        let actions = Self::enabled_actions(snapshot, identity);

        GameView {
            state_label: format::state_label(snapshot.status),
            result_label: format::result_label(snapshot.outcome),
            bet: format::ether(snapshot.bet),
            player_cards: snapshot.player_cards.iter().copied().map(CardView::shown).collect(),
            dealer_cards: Self::dealer_cards(snapshot),
            player_score: snapshot.player_score,
            dealer_score: (!hidden).then_some(snapshot.dealer_score),
            status: Self::status_line(snapshot.status, snapshot.outcome),
            banner: Self::result_banner(snapshot, actions.contains(ActionSet::PAYOUT)),
            actions,
        }
    }

    /// Action table keyed on the reported state.
    ///
    /// | state      | actions                                   |
    /// |------------|-------------------------------------------|
    /// | Idle       | start                                     |
    /// | PlayerTurn | hit, stand                                |
    /// | DealerTurn | none                                      |
    /// | Finished   | reset, start; payout for a payable result |
    ///
    /// Payout additionally requires the local identity to be the recorded
    /// player. Unknown states offer nothing.
    pub fn enabled_actions(snapshot: &GameSnapshot, identity: Option<&Address>) -> ActionSet {
        match snapshot.status {
            GameStatus::Idle => ActionSet::START,
            GameStatus::PlayerTurn => ActionSet::HIT | ActionSet::STAND,
            GameStatus::DealerTurn => ActionSet::empty(),
            GameStatus::Finished => {
                let mut actions = ActionSet::RESET | ActionSet::START;
                let is_player = identity.is_some_and(|id| snapshot.is_recorded_player(id));
                if is_player && snapshot.outcome.is_payable() {
                    actions |= ActionSet::PAYOUT;
                }
                actions
            }
            GameStatus::Unknown(_) => ActionSet::empty(),
        }
    }

    /// The dealer's first card is face down only during the player's turn.
    pub fn hides_hole_card(status: GameStatus) -> bool {
        status == GameStatus::PlayerTurn
    }

    pub fn dealer_cards(snapshot: &GameSnapshot) -> Vec<CardView> {
        let hidden = Self::hides_hole_card(snapshot.status);
        snapshot
            .dealer_cards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                if hidden && index == 0 {
                    CardView::Hidden
                } else {
                    CardView::shown(*card)
                }
            })
            .collect()
    }

    /// Status text for a state and result, as shown when nothing more urgent
    /// is pending.
    pub fn status_line(status: GameStatus, outcome: GameOutcome) -> StatusLine {
        match status {
            GameStatus::Idle => StatusLine::new("🎯 Ready to play! Place your bet.", StatusTone::Ready),
            GameStatus::PlayerTurn => {
                StatusLine::new("🎮 Your turn! Hit or Stand?", StatusTone::Attention)
            }
            GameStatus::DealerTurn => StatusLine::new("🏦 Dealer is playing...", StatusTone::Waiting),
            GameStatus::Finished => {
                let tone = match outcome {
                    GameOutcome::PlayerWin => StatusTone::Win,
                    GameOutcome::DealerWin => StatusTone::Lose,
                    GameOutcome::Push | GameOutcome::None | GameOutcome::Unknown(_) => {
                        StatusTone::Neutral
                    }
                };
                StatusLine::new(format::result_label(outcome), tone)
            }
            GameStatus::Unknown(code) => StatusLine::new(code.to_string(), StatusTone::Neutral),
        }
    }

    pub fn result_banner(snapshot: &GameSnapshot, can_claim: bool) -> Option<ResultBanner> {
        if snapshot.status != GameStatus::Finished {
            return None;
        }
        let (player, dealer) = (snapshot.player_score, snapshot.dealer_score);

        let banner = match snapshot.outcome {
            GameOutcome::PlayerWin => ResultBanner {
                text: format!("🎉 You Win! {player} vs {dealer}"),
                tone: StatusTone::Win,
                claim_hint: can_claim.then_some(CLAIM_HINT),
            },
            GameOutcome::DealerWin => {
                let bust = if snapshot.player_busted() { " (Bust!)" } else { "" };
                ResultBanner {
                    text: format!("😞 Dealer Wins! {dealer} vs {player}{bust}"),
                    tone: StatusTone::Lose,
                    claim_hint: None,
                }
            }
            GameOutcome::Push => ResultBanner {
                text: format!("🤝 Push! {player} vs {dealer}"),
                tone: StatusTone::Neutral,
                claim_hint: None,
            },
            GameOutcome::None | GameOutcome::Unknown(_) => return None,
        };
        Some(banner)
    }

    /// Card labels joined for a single line, or the empty-hand placeholder.
    pub fn hand_label(cards: &[CardView]) -> String {
        if cards.is_empty() {
            return format::EMPTY_HAND.to_string();
        }
        cards
            .iter()
            .map(CardView::label)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_OUTCOMES: [GameOutcome; 5] = [
        GameOutcome::None,
        GameOutcome::PlayerWin,
        GameOutcome::DealerWin,
        GameOutcome::Push,
        GameOutcome::Unknown(77),
    ];

    fn me() -> Address {
        Address([0x42; 20])
    }

    fn someone_else() -> Address {
        Address([0x24; 20])
    }

    fn snapshot(status: GameStatus, outcome: GameOutcome, dealt: usize) -> GameSnapshot {
        GameSnapshot {
            status,
            outcome,
            bet: 1_000,
            recorded_player: me(),
            player_cards: vec![Card::from_code(10), Card::from_code(7)],
            dealer_cards: (0..dealt).map(|i| Card::from_code(i as u64 % 13 + 1)).collect(),
            player_score: 17,
            dealer_score: 19,
        }
    }

    #[test]
    fn action_table_matches_every_state_result_and_identity() {
        let identities = [Some(me()), Some(someone_else()), None];

        for outcome in ALL_OUTCOMES {
            for identity in &identities {
                let actions = |status| {
                    ViewModelDeriver::enabled_actions(
                        &snapshot(status, outcome, 2),
                        identity.as_ref(),
                    )
                };

                assert_eq!(actions(GameStatus::Idle), ActionSet::START);
                assert_eq!(actions(GameStatus::PlayerTurn), ActionSet::HIT | ActionSet::STAND);
                assert_eq!(actions(GameStatus::DealerTurn), ActionSet::empty());
                assert_eq!(actions(GameStatus::Unknown(9)), ActionSet::empty());

                let finished = actions(GameStatus::Finished);
                assert!(finished.contains(ActionSet::RESET | ActionSet::START));
                assert!(!finished.intersects(ActionSet::HIT | ActionSet::STAND));
            }
        }
    }

    #[test]
    fn payout_requires_finished_payable_result_for_recorded_player() {
        let identities = [Some(me()), Some(someone_else()), None];
        let statuses = [
            GameStatus::Idle,
            GameStatus::PlayerTurn,
            GameStatus::DealerTurn,
            GameStatus::Finished,
            GameStatus::Unknown(4),
        ];

        for status in statuses {
            for outcome in ALL_OUTCOMES {
                for identity in &identities {
                    let snap = snapshot(status, outcome, 2);
                    let expected = *identity == Some(me())
                        && matches!(outcome, GameOutcome::PlayerWin | GameOutcome::Push)
                        && status == GameStatus::Finished;
                    let actions = ViewModelDeriver::enabled_actions(&snap, identity.as_ref());
                    assert_eq!(actions.allows(ActionKind::Payout), expected, "{status:?} {outcome:?}");
                }
            }
        }
    }

    #[test]
    fn hole_card_hidden_only_during_player_turn() {
        for dealt in 1..=6 {
            for status in [
                GameStatus::Idle,
                GameStatus::PlayerTurn,
                GameStatus::DealerTurn,
                GameStatus::Finished,
            ] {
                let cards = ViewModelDeriver::dealer_cards(&snapshot(status, GameOutcome::None, dealt));
                assert_eq!(cards.len(), dealt);
                assert_eq!(cards[0].is_hidden(), status == GameStatus::PlayerTurn);
                assert!(cards[1..].iter().all(|c| !c.is_hidden()));
            }
        }
    }

    #[test]
    fn hidden_hole_card_hides_dealer_score() {
        let view = ViewModelDeriver::derive(
            &snapshot(GameStatus::PlayerTurn, GameOutcome::None, 2),
            Some(&me()),
        );
        assert_eq!(view.dealer_cards[0].label(), "?");
        assert_eq!(view.dealer_score, None);

        let view = ViewModelDeriver::derive(
            &snapshot(GameStatus::DealerTurn, GameOutcome::None, 2),
            Some(&me()),
        );
        assert_eq!(view.dealer_score, Some(19));
    }

    #[test]
    fn banners_follow_the_result() {
        let win = snapshot(GameStatus::Finished, GameOutcome::PlayerWin, 2);
        let banner = ViewModelDeriver::result_banner(&win, true).unwrap();
        assert_eq!(banner.text, "🎉 You Win! 17 vs 19");
        assert_eq!(banner.claim_hint, Some(CLAIM_HINT));

        let mut bust = snapshot(GameStatus::Finished, GameOutcome::DealerWin, 2);
        bust.player_score = 25;
        let banner = ViewModelDeriver::result_banner(&bust, false).unwrap();
        assert_eq!(banner.text, "😞 Dealer Wins! 19 vs 25 (Bust!)");

        let push = snapshot(GameStatus::Finished, GameOutcome::Push, 2);
        // A push is still claimable, but the hint is reserved for wins.
        let banner = ViewModelDeriver::result_banner(&push, true).unwrap();
        assert_eq!(banner.text, "🤝 Push! 17 vs 19");
        assert_eq!(banner.claim_hint, None);

        let playing = snapshot(GameStatus::PlayerTurn, GameOutcome::None, 2);
        assert!(ViewModelDeriver::result_banner(&playing, false).is_none());
    }

    #[test]
    fn status_lines_per_state() {
        let line = ViewModelDeriver::status_line(GameStatus::Idle, GameOutcome::None);
        assert_eq!(line.text, "🎯 Ready to play! Place your bet.");
        assert_eq!(line.tone, StatusTone::Ready);

        let line = ViewModelDeriver::status_line(GameStatus::Finished, GameOutcome::DealerWin);
        assert_eq!(line.text, "😞 Dealer Wins");
        assert_eq!(line.tone, StatusTone::Lose);

        let line = ViewModelDeriver::status_line(GameStatus::Unknown(6), GameOutcome::None);
        assert_eq!(line.text, "6");
        assert_eq!(line.tone, StatusTone::Neutral);
    }

    #[test]
    fn empty_hand_uses_placeholder() {
        assert_eq!(ViewModelDeriver::hand_label(&[]), "No cards yet");
        let cards = [
            CardView::Hidden,
            CardView::Shown {
                name: "A".to_string(),
                color: CardColor::Red,
            },
        ];
        assert_eq!(ViewModelDeriver::hand_label(&cards), "? A");
    }
}
