//! Conversion of raw reads into an immutable [`GameSnapshot`].
//!
//! Scores and the bet are kept at full 128-bit width; a value that does not
//! fit is an error rather than a silent truncation. Codes never fail: cards
//! keep their full raw word, and a status or result code too wide for 64 bits
//! saturates so it stays [`GameStatus::Unknown`] / [`GameOutcome::Unknown`].
use client_blockchain_core::Word;
use game_core::{Card, GameOutcome, GameSnapshot, GameStatus};
use thiserror::Error;

use crate::client::RawSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("{field} value {value} exceeds the local numeric range")]
    Overflow { field: &'static str, value: Word },
}

/// Stateless translation stage.
pub struct StateReconciler;

impl StateReconciler {
    pub fn reconcile(raw: RawSnapshot) -> Result<GameSnapshot, ReconcileError> {
        let (status, outcome) = Self::status(&raw.state, &raw.result);

        Ok(GameSnapshot {
            status,
            outcome,
            bet: wide(&raw.bet, "bet")?,
            recorded_player: raw.player,
            player_cards: cards(&raw.player_cards),
            dealer_cards: cards(&raw.dealer_cards),
            player_score: wide(&raw.player_score, "player score")?,
            dealer_score: wide(&raw.dealer_score, "dealer score")?,
        })
    }

    pub fn status(state: &Word, result: &Word) -> (GameStatus, GameOutcome) {
        (
            GameStatus::from_code(code(state)),
            GameOutcome::from_code(code(result)),
        )
    }
}

fn wide(word: &Word, field: &'static str) -> Result<u128, ReconcileError> {
    word.to_u128()
        .ok_or(ReconcileError::Overflow { field, value: *word })
}

/// Status and result code; anything wider than 64 bits is unknown anyway.
pub(crate) fn code(word: &Word) -> u64 {
    word.to_u64().unwrap_or(u64::MAX)
}

fn cards(words: &[Word]) -> Vec<Card> {
    words.iter().map(|word| Card::from_be_bytes(word.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Address;

    fn raw() -> RawSnapshot {
        RawSnapshot {
            state: Word::from(1u64),
            result: Word::from(0u64),
            player_score: Word::from(15u64),
            dealer_score: Word::from(9u64),
            bet: Word::from(50_000_000_000_000_000u128),
            player: Address([4; 20]),
            player_cards: vec![Word::from(10u64), Word::from(5u64)],
            dealer_cards: vec![Word::from(1u64), Word::from(8u64)],
        }
    }

    #[test]
    fn builds_snapshot_from_raw_reads() {
        let snapshot = StateReconciler::reconcile(raw()).unwrap();
        assert_eq!(snapshot.status, GameStatus::PlayerTurn);
        assert_eq!(snapshot.outcome, GameOutcome::None);
        assert_eq!(snapshot.bet, 50_000_000_000_000_000);
        assert_eq!(
            snapshot.player_cards,
            vec![Card::from_code(10), Card::from_code(5)]
        );
        assert_eq!(snapshot.dealer_cards[0].name(), "A");
        assert_eq!(snapshot.player_score, 15);
    }

    #[test]
    fn large_bets_are_not_truncated() {
        let mut input = raw();
        input.bet = Word::from(u128::MAX);
        assert_eq!(StateReconciler::reconcile(input).unwrap().bet, u128::MAX);

        let mut input = raw();
        let mut bytes = [0u8; 32];
        bytes[15] = 1;
        input.bet = Word(bytes);
        assert!(matches!(
            StateReconciler::reconcile(input),
            Err(ReconcileError::Overflow { field: "bet", .. })
        ));
    }

    #[test]
    fn unknown_codes_are_preserved() {
        let (status, outcome) = StateReconciler::status(&Word::from(7u64), &Word::from(42u64));
        assert_eq!(status, GameStatus::Unknown(7));
        assert_eq!(outcome, GameOutcome::Unknown(42));
    }

    fn huge() -> Word {
        let mut bytes = [0u8; 32];
        bytes[0] = 1;
        Word(bytes)
    }

    #[test]
    fn oversized_card_keeps_snapshot_readable() {
        let mut input = raw();
        input.player_cards = vec![Word::from(10u64), huge()];

        let snapshot = StateReconciler::reconcile(input).unwrap();
        assert_eq!(snapshot.player_cards[0].name(), "10");
        assert_eq!(snapshot.player_cards[1].code(), None);
        assert!(snapshot.player_cards[1].name().starts_with("0x01"));
    }

    #[test]
    fn oversized_status_codes_are_unknown() {
        let mut input = raw();
        input.state = huge();
        input.result = huge();

        let snapshot = StateReconciler::reconcile(input).unwrap();
        assert_eq!(snapshot.status, GameStatus::Unknown(u64::MAX));
        assert_eq!(snapshot.outcome, GameOutcome::Unknown(u64::MAX));
    }
}
