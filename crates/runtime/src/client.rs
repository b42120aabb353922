//! Reads and two-phase writes against the remote authority.
use std::sync::Arc;

use client_blockchain_core::{
    GameContract, PendingTx, ReadError, TxReceipt, Word, WriteError, method_name,
};
use game_core::{Address, GameAction};
use tracing::debug;

/// Raw values of one refresh cycle, before conversion to local types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSnapshot {
    pub state: Word,
    pub result: Word,
    pub player_score: Word,
    pub dealer_score: Word,
    pub bet: Word,
    pub player: Address,
    pub player_cards: Vec<Word>,
    pub dealer_cards: Vec<Word>,
}

/// Cheap to clone; every in-flight task carries its own copy.
#[derive(Clone)]
pub struct RemoteStateClient {
    contract: Arc<dyn GameContract>,
}

impl RemoteStateClient {
    pub fn new(contract: Arc<dyn GameContract>) -> Self {
        Self { contract }
    }

    pub fn contract_address(&self) -> Address {
        self.contract.address()
    }

    /// Read the whole game in two concurrent batches.
    ///
    /// The batches are not atomic: if the game advances between reads the
    /// result is torn, and the next refresh corrects it.
    pub async fn read_snapshot(&self) -> Result<RawSnapshot, ReadError> {
        let contract = self.contract.as_ref();

        let (state, result, player_score, dealer_score, bet, player) = tokio::try_join!(
            contract.game_state(),
            contract.game_result(),
            contract.player_score(),
            contract.dealer_score(),
            contract.bet(),
            contract.player(),
        )?;
        let (player_cards, dealer_cards) =
            tokio::try_join!(contract.player_cards(), contract.dealer_cards())?;

        debug!(
            %state,
            %result,
            player_cards = player_cards.len(),
            dealer_cards = dealer_cards.len(),
            "remote snapshot read"
        );

        Ok(RawSnapshot {
            state,
            result,
            player_score,
            dealer_score,
            bet,
            player,
            player_cards,
            dealer_cards,
        })
    }

    /// Read only the state and result codes.
    pub async fn read_status(&self) -> Result<(Word, Word), ReadError> {
        let contract = self.contract.as_ref();
        tokio::try_join!(contract.game_state(), contract.game_result())
    }

    /// Submit an action. The returned handle is not applied yet.
    pub async fn submit(&self, action: GameAction) -> Result<PendingTx, WriteError> {
        debug!(method = method_name(&action), "sending transaction");
        self.contract.submit(action).await
    }

    /// Suspend until the authority has applied (or reverted) the action.
    pub async fn confirm(&self, pending: &PendingTx) -> Result<TxReceipt, WriteError> {
        self.contract.confirm(pending).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::MockBlackjack;
    use game_core::WEI_PER_ETHER;

    fn setup() -> (MockBlackjack, RemoteStateClient) {
        let mock = MockBlackjack::new(3, vec![Address([9; 20])]);
        let client = RemoteStateClient::new(Arc::new(mock.clone()));
        (mock, client)
    }

    #[tokio::test]
    async fn snapshot_reads_all_eight_getters() {
        let (mock, client) = setup();
        let raw = client.read_snapshot().await.unwrap();
        assert_eq!(raw.state, Word::ZERO);
        assert!(raw.player_cards.is_empty());
        assert_eq!(mock.read_calls(), 8);

        client.read_status().await.unwrap();
        assert_eq!(mock.read_calls(), 10);
    }

    #[tokio::test]
    async fn one_failing_read_fails_the_batch() {
        let (mock, client) = setup();
        mock.fail_reads(Some("rpc timeout".to_string()));
        assert!(matches!(
            client.read_snapshot().await,
            Err(ReadError::CallFailed { .. })
        ));
    }

    #[tokio::test]
    async fn submitted_action_is_not_applied_before_confirmation() {
        let (mock, client) = setup();
        mock.queue_cards([2, 3, 4, 5]);

        let pending = client
            .submit(GameAction::Start {
                stake: WEI_PER_ETHER / 20,
            })
            .await
            .unwrap();
        let (state, _) = client.read_status().await.unwrap();
        assert_eq!(state, Word::ZERO);

        client.confirm(&pending).await.unwrap();
        let (state, _) = client.read_status().await.unwrap();
        assert_eq!(state, Word::from(1u64));
    }
}
