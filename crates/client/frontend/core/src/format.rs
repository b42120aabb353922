//! Display text for statuses, results, notices and wallet details.
//!
//! Every user-facing string lives here so that all frontends word things the
//! same way.
use game_core::{ActionKind, Address, GameOutcome, GameStatus, NetworkInfo, Wei, format_ether};
use runtime::Notice;

use crate::message::{MessageEntry, MessageLevel};

/// Balances are cut to this many characters.
pub const BALANCE_DISPLAY_LEN: usize = 7;

pub const EMPTY_HAND: &str = "No cards yet";
pub const HIDDEN_CARD: &str = "?";
pub const BUST_ADVISORY: &str = "Bust! You went over 21.";
pub const DISCONNECTED: &str = "Wallet disconnected. Connect to play.";

pub fn state_label(status: GameStatus) -> String {
    match status {
        GameStatus::Idle => "Idle ⏸️".to_string(),
        GameStatus::PlayerTurn => "Your Turn 🎮".to_string(),
        GameStatus::DealerTurn => "Dealer Turn 🏦".to_string(),
        GameStatus::Finished => "Finished ✅".to_string(),
        GameStatus::Unknown(code) => code.to_string(),
    }
}

pub fn result_label(outcome: GameOutcome) -> String {
    match outcome {
        GameOutcome::None => "None".to_string(),
        GameOutcome::PlayerWin => "🎉 You Win!".to_string(),
        GameOutcome::DealerWin => "😞 Dealer Wins".to_string(),
        GameOutcome::Push => "🤝 Push".to_string(),
        GameOutcome::Unknown(code) => code.to_string(),
    }
}

pub fn ether(amount: Wei) -> String {
    format!("{} ETH", format_ether(amount))
}

/// Ether amount cut to [`BALANCE_DISPLAY_LEN`] characters.
pub fn balance(amount: Wei) -> String {
    format_ether(amount)
        .chars()
        .take(BALANCE_DISPLAY_LEN)
        .collect()
}

pub fn short_address(address: &Address) -> String {
    address.short()
}

pub fn network_line(network: &NetworkInfo) -> String {
    format!("Network: {} (Chain ID: {})", network.name, network.chain_id)
}

pub fn pending_text(action: ActionKind) -> &'static str {
    match action {
        ActionKind::Start => "Starting game...",
        ActionKind::Hit => "Taking a card...",
        ActionKind::Stand => "Standing...",
        ActionKind::Payout => "Claiming winnings...",
        ActionKind::Reset => "Resetting game...",
    }
}

/// `Failed to <verb>: <reason>`, without the error marker.
pub fn failure_text(action: ActionKind, reason: &str) -> String {
    let verb = match action {
        ActionKind::Start => "start game",
        ActionKind::Hit => "hit",
        ActionKind::Stand => "stand",
        ActionKind::Payout => "claim",
        ActionKind::Reset => "reset",
    };
    format!("Failed to {verb}: {reason}")
}

pub fn error_status(text: &str) -> String {
    format!("❌ {text}")
}

/// Messages announced for a notice, in display order.
pub fn notice_messages(notice: &Notice) -> Vec<MessageEntry> {
    match notice {
        Notice::ActionPending(action) => {
            vec![MessageEntry::info(pending_text(*action))]
        }
        Notice::ActionConfirmed(ActionKind::Start) => {
            vec![MessageEntry::new("Game started successfully!", MessageLevel::Success)]
        }
        Notice::ActionConfirmed(_) => Vec::new(),
        Notice::GameStarted { bet, .. } => {
            vec![MessageEntry::info(format!("Game started! Bet: {}", ether(*bet)))]
        }
        Notice::PlayerDrew { card, .. } => {
            vec![MessageEntry::info(format!("You drew: {}", card.name()))]
        }
        Notice::DealerDrew { card, .. } => {
            vec![MessageEntry::info(format!("Dealer drew: {}", card.name()))]
        }
        Notice::GameFinished { outcome } => {
            let mut messages = vec![MessageEntry::info(format!(
                "Game finished! Result: {}",
                result_label(*outcome)
            ))];
            match outcome {
                GameOutcome::PlayerWin => {
                    messages.push(MessageEntry::new("🎉 You Win!", MessageLevel::Success));
                }
                GameOutcome::DealerWin => {
                    messages.push(MessageEntry::new("Dealer wins 😞", MessageLevel::Warning));
                }
                GameOutcome::Push => messages.push(MessageEntry::info("Push! It's a tie.")),
                GameOutcome::None | GameOutcome::Unknown(_) => {}
            }
            messages
        }
        Notice::PayoutReceived { amount } => vec![MessageEntry::new(
            format!("🎊 Payout received: {}", ether(*amount)),
            MessageLevel::Success,
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Card, WEI_PER_ETHER, parse_ether};

    fn texts(notice: Notice) -> Vec<String> {
        notice_messages(&notice)
            .into_iter()
            .map(|entry| entry.text)
            .collect()
    }

    #[test]
    fn start_event_shows_stake_in_ether() {
        let bet = parse_ether("0.05").unwrap();
        assert_eq!(
            texts(Notice::GameStarted {
                player: Address::ZERO,
                bet,
            }),
            ["Game started! Bet: 0.05 ETH"]
        );
    }

    #[test]
    fn finish_notice_is_followed_by_result_specific_text() {
        assert_eq!(
            texts(Notice::GameFinished {
                outcome: GameOutcome::DealerWin,
            }),
            ["Game finished! Result: 😞 Dealer Wins", "Dealer wins 😞"]
        );
        assert_eq!(
            texts(Notice::GameFinished {
                outcome: GameOutcome::Push,
            }),
            ["Game finished! Result: 🤝 Push", "Push! It's a tie."]
        );
        assert_eq!(
            texts(Notice::GameFinished {
                outcome: GameOutcome::Unknown(8),
            }),
            ["Game finished! Result: 8"]
        );
    }

    #[test]
    fn only_start_has_a_confirmation_message() {
        assert_eq!(
            texts(Notice::ActionConfirmed(ActionKind::Start)),
            ["Game started successfully!"]
        );
        assert!(texts(Notice::ActionConfirmed(ActionKind::Hit)).is_empty());
    }

    #[test]
    fn draw_notices_use_card_names() {
        assert_eq!(
            texts(Notice::PlayerDrew {
                card: Card::from_code(13),
                total: 20,
            }),
            ["You drew: K"]
        );
        assert_eq!(
            texts(Notice::DealerDrew {
                card: Card::from_code(42),
                total: 20,
            }),
            ["Dealer drew: 42"]
        );
    }

    #[test]
    fn failure_texts_name_the_action() {
        assert_eq!(
            failure_text(ActionKind::Start, "insufficient funds"),
            "Failed to start game: insufficient funds"
        );
        assert_eq!(failure_text(ActionKind::Payout, "x"), "Failed to claim: x");
        assert_eq!(error_status("Failed to hit: x"), "❌ Failed to hit: x");
    }

    #[test]
    fn balance_is_cut_to_seven_characters() {
        assert_eq!(balance(10 * WEI_PER_ETHER), "10.0");
        assert_eq!(balance(parse_ether("9.87654321").unwrap()), "9.87654");
    }

    #[test]
    fn labels_fall_back_to_raw_codes() {
        assert_eq!(state_label(GameStatus::PlayerTurn), "Your Turn 🎮");
        assert_eq!(state_label(GameStatus::Unknown(12)), "12");
        assert_eq!(result_label(GameOutcome::Push), "🤝 Push");
        assert_eq!(
            network_line(&NetworkInfo::new("sepolia", 11155111)),
            "Network: sepolia (Chain ID: 11155111)"
        );
    }
}
