//! Plain-text rendering of a [`Frame`].
use std::fmt::Write;

use client_frontend_core::{ActionSet, Frame, GameView, ViewModelDeriver};
use game_core::ActionKind;
use strum::IntoEnumIterator;

const RULE: &str = "────────────────────────────────────────";

pub fn render(frame: &Frame) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");

    if let Some(fatal) = &frame.fatal {
        let _ = writeln!(out, "{fatal}");
    }
    if let Some(wallet) = &frame.wallet {
        let _ = writeln!(
            out,
            "Wallet: {} | Balance: {} ETH | {}",
            wallet.address, wallet.balance, wallet.network
        );
    }
    if let Some(game) = &frame.game {
        render_table(&mut out, game);
    }

    let _ = writeln!(out, "[{}] {}", frame.status.tone, frame.status.text);
    if let Some(notice) = &frame.notice {
        let _ = writeln!(out, "» {notice}");
    }
    let _ = writeln!(out, "Actions: {}", action_list(frame.actions));
    out
}

fn render_table(out: &mut String, game: &GameView) {
    let _ = writeln!(
        out,
        "State: {} | Result: {} | Bet: {} ETH",
        game.state_label, game.result_label, game.bet
    );
    let dealer_score = game
        .dealer_score
        .map_or_else(|| "?".to_string(), |score| score.to_string());
    let _ = writeln!(
        out,
        "Dealer ({dealer_score}): {}",
        ViewModelDeriver::hand_label(&game.dealer_cards)
    );
    let _ = writeln!(
        out,
        "You ({}): {}",
        game.player_score,
        ViewModelDeriver::hand_label(&game.player_cards)
    );
    if let Some(banner) = &game.banner {
        let _ = writeln!(out, "{}", banner.text);
        if let Some(hint) = banner.claim_hint {
            let _ = writeln!(out, "{hint} (type `payout`)");
        }
    }
}

pub fn action_list(actions: ActionSet) -> String {
    let names: Vec<&'static str> = ActionKind::iter()
        .filter(|kind| actions.allows(*kind))
        .map(<&'static str>::from)
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
