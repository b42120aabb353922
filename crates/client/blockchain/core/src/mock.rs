//! In-memory blackjack authority for tests and the local demo.
//!
//! Behaves like the deployed contract from the client's point of view: reads
//! are idempotent, writes only take effect on confirmation, and every state
//! change is announced through the log stream. Faults can be injected to
//! exercise the client's recovery paths.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use game_core::{Address, GameAction, NetworkInfo, WEI_PER_ETHER, Wei};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::events::{EventKind, LogSubscription, LogValue, RawLog, SubscriptionId};
use crate::traits::{
    ContractReader, ContractWriter, EnvironmentChange, EventSource, GameContract, ReadError,
    TransportError, WalletProvider, WriteError,
};
use crate::types::{PendingTx, TxHash, TxReceipt, Word};

const STATE_IDLE: u64 = 0;
const STATE_PLAYER_TURN: u64 = 1;
const STATE_DEALER_TURN: u64 = 2;
const STATE_FINISHED: u64 = 3;

const RESULT_NONE: u64 = 0;
const RESULT_PLAYER_WIN: u64 = 1;
const RESULT_DEALER_WIN: u64 = 2;
const RESULT_PUSH: u64 = 3;

const DEALER_STANDS_AT: u128 = 17;
const BLACKJACK: u128 = 21;
const GAS_PER_CALL: u64 = 21_000;

/// Address the mock pretends to be deployed at.
pub const MOCK_CONTRACT_ADDRESS: Address = Address([0xc5; 20]);

#[derive(Debug, Default)]
struct Table {
    status: u64,
    result: u64,
    bet: Wei,
    player: Address,
    player_cards: Vec<u64>,
    dealer_cards: Vec<u64>,
    paid: bool,
}

struct MockState {
    table: Table,
    balances: HashMap<Address, Wei>,
    accounts: Vec<Address>,
    network: NetworkInfo,
    available: bool,
    rng: StdRng,
    scripted_cards: VecDeque<u64>,
    pending: HashMap<TxHash, PendingTx>,
    tx_counter: u64,
    block_number: u64,
    reject_next: Option<String>,
    revert_next: Option<String>,
    read_failure: Option<String>,
    read_calls: u64,
    state_read_delays: VecDeque<Duration>,
    confirm_delay: Option<Duration>,
    subscribe_failure: Option<String>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<RawLog>>,
    subscription_counter: u64,
    env_watchers: Vec<mpsc::UnboundedSender<EnvironmentChange>>,
}

/// Mock blackjack contract plus hosting wallet.
///
/// Cloning yields another handle onto the same ledger.
#[derive(Clone)]
pub struct MockBlackjack {
    state: Arc<Mutex<MockState>>,
}

impl MockBlackjack {
    /// Ledger with the given accounts, each funded with 10 ether.
    ///
    /// The first account is the active identity.
    pub fn new(seed: u64, accounts: Vec<Address>) -> Self {
        let balances = accounts
            .iter()
            .map(|account| (*account, 10 * WEI_PER_ETHER))
            .collect();

        Self {
            state: Arc::new(Mutex::new(MockState {
                table: Table::default(),
                balances,
                accounts,
                network: NetworkInfo::new("localhost", 31337),
                available: true,
                rng: StdRng::seed_from_u64(seed),
                scripted_cards: VecDeque::new(),
                pending: HashMap::new(),
                tx_counter: 0,
                block_number: 1,
                reject_next: None,
                revert_next: None,
                read_failure: None,
                read_calls: 0,
                state_read_delays: VecDeque::new(),
                confirm_delay: None,
                subscribe_failure: None,
                subscribers: HashMap::new(),
                subscription_counter: 0,
                env_watchers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only happens after a panicking test; keep going.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------
    // Fault injection and scripting
    // ------------------------------------------------------------------

    /// Cards dealt next, in order, before falling back to the seeded deck.
    pub fn queue_cards(&self, cards: impl IntoIterator<Item = u64>) {
        self.lock().scripted_cards.extend(cards);
    }

    /// The next `submit` is refused, as if the user declined to sign.
    pub fn reject_next_write(&self, reason: impl Into<String>) {
        self.lock().reject_next = Some(reason.into());
    }

    /// The next `confirm` reverts without applying the action.
    pub fn revert_next_confirm(&self, reason: impl Into<String>) {
        self.lock().revert_next = Some(reason.into());
    }

    /// Make every read fail (`Some`) or succeed again (`None`).
    pub fn fail_reads(&self, reason: Option<String>) {
        self.lock().read_failure = reason;
    }

    /// The next `gameState` reads answer late, by these delays in order.
    ///
    /// The value is taken when the call arrives, so a delayed read reports
    /// the state as it was then.
    pub fn delay_state_reads(&self, delays: impl IntoIterator<Item = Duration>) {
        self.lock().state_read_delays.extend(delays);
    }

    /// Hold the next confirmation before it lands on the table.
    pub fn delay_next_confirm(&self, delay: Duration) {
        self.lock().confirm_delay = Some(delay);
    }

    /// Refuse new log subscriptions (`Some`) or accept them again (`None`).
    pub fn refuse_subscriptions(&self, reason: Option<String>) {
        self.lock().subscribe_failure = reason;
    }

    /// Simulate an unreachable provider.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    pub fn fund(&self, account: Address, amount: Wei) {
        *self.lock().balances.entry(account).or_insert(0) += amount;
    }

    /// Overwrite raw status/result codes, including codes the client does not know.
    pub fn force_codes(&self, status: u64, result: u64) {
        let mut state = self.lock();
        state.table.status = status;
        state.table.result = result;
    }

    /// Deliver an arbitrary log to every subscriber.
    pub fn emit_raw(&self, log: RawLog) {
        self.lock().broadcast(log);
    }

    /// Switch the active account and notify watchers.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        let mut state = self.lock();
        for account in &accounts {
            state.balances.entry(*account).or_insert(10 * WEI_PER_ETHER);
        }
        state.accounts = accounts.clone();
        state.notify_environment(EnvironmentChange::AccountsChanged(accounts));
    }

    pub fn switch_chain(&self, network: NetworkInfo) {
        let mut state = self.lock();
        state.network = network.clone();
        state.notify_environment(EnvironmentChange::ChainChanged(network));
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn active_subscriptions(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|_, tx| !tx.is_closed());
        state.subscribers.len()
    }

    pub fn read_calls(&self) -> u64 {
        self.lock().read_calls
    }

    pub fn queued_state_delays(&self) -> usize {
        self.lock().state_read_delays.len()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn balance_of(&self, account: &Address) -> Wei {
        self.lock().balances.get(account).copied().unwrap_or(0)
    }

    fn read<T>(&self, method: &'static str, f: impl FnOnce(&Table) -> T) -> Result<T, ReadError> {
        let mut state = self.lock();
        state.read_calls += 1;
        if !state.available {
            return Err(TransportError::ProviderUnavailable.into());
        }
        if let Some(reason) = &state.read_failure {
            return Err(ReadError::CallFailed {
                method,
                reason: reason.clone(),
            });
        }
        Ok(f(&state.table))
    }
}

impl MockState {
    fn broadcast(&mut self, log: RawLog) {
        self.subscribers.retain(|_, tx| tx.send(log.clone()).is_ok());
    }

    fn notify_environment(&mut self, change: EnvironmentChange) {
        self.env_watchers.retain(|tx| tx.send(change.clone()).is_ok());
    }

    fn draw(&mut self) -> u64 {
        match self.scripted_cards.pop_front() {
            Some(card) => card,
            None => self.rng.gen_range(1..=13),
        }
    }

    fn next_hash(&mut self) -> TxHash {
        self.tx_counter += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&self.tx_counter.to_be_bytes());
        TxHash(bytes)
    }

    fn log(&self, kind: EventKind, args: Vec<LogValue>) -> RawLog {
        RawLog::new(kind, args, self.block_number)
    }

    /// Apply a confirmed action, returning the logs it produced.
    fn apply(&mut self, pending: &PendingTx) -> Result<Vec<RawLog>, String> {
        let sender = pending.sender;
        let mut logs = Vec::new();

        match pending.action {
            GameAction::Start { stake } => {
                if !matches!(self.table.status, STATE_IDLE | STATE_FINISHED) {
                    return Err("Game in progress".to_string());
                }
                if stake == 0 {
                    return Err("Bet required".to_string());
                }
                let balance = self.balances.entry(sender).or_insert(0);
                if *balance < stake {
                    return Err("Insufficient funds".to_string());
                }
                *balance -= stake;

                self.table = Table {
                    status: STATE_PLAYER_TURN,
                    result: RESULT_NONE,
                    bet: stake,
                    player: sender,
                    ..Table::default()
                };
                for _ in 0..2 {
                    let card = self.draw();
                    self.table.player_cards.push(card);
                    let card = self.draw();
                    self.table.dealer_cards.push(card);
                }
                logs.push(self.log(
                    EventKind::GameStarted,
                    vec![LogValue::Address(sender), LogValue::Uint(Word::from(stake))],
                ));
            }
            GameAction::Hit => {
                self.require_turn(sender)?;
                let card = self.draw();
                self.table.player_cards.push(card);
                let total = hand_score(&self.table.player_cards);
                logs.push(self.log(
                    EventKind::PlayerHit,
                    vec![
                        LogValue::Uint(Word::from(card)),
                        LogValue::Uint(Word::from(total)),
                    ],
                ));
                if total > BLACKJACK {
                    logs.push(self.finish(RESULT_DEALER_WIN));
                }
            }
            GameAction::Stand => {
                self.require_turn(sender)?;
                self.table.status = STATE_DEALER_TURN;
                while hand_score(&self.table.dealer_cards) < DEALER_STANDS_AT {
                    let card = self.draw();
                    self.table.dealer_cards.push(card);
                    let total = hand_score(&self.table.dealer_cards);
                    logs.push(self.log(
                        EventKind::DealerHit,
                        vec![
                            LogValue::Uint(Word::from(card)),
                            LogValue::Uint(Word::from(total)),
                        ],
                    ));
                }
                let player = hand_score(&self.table.player_cards);
                let dealer = hand_score(&self.table.dealer_cards);
                let result = if dealer > BLACKJACK || player > dealer {
                    RESULT_PLAYER_WIN
                } else if player == dealer {
                    RESULT_PUSH
                } else {
                    RESULT_DEALER_WIN
                };
                logs.push(self.finish(result));
            }
            GameAction::ClaimPayout => {
                let claimable = self.table.status == STATE_FINISHED
                    && self.table.player == sender
                    && matches!(self.table.result, RESULT_PLAYER_WIN | RESULT_PUSH)
                    && !self.table.paid;
                if !claimable {
                    return Err("Nothing to claim".to_string());
                }
                let amount = if self.table.result == RESULT_PLAYER_WIN {
                    self.table.bet * 2
                } else {
                    self.table.bet
                };
                *self.balances.entry(sender).or_insert(0) += amount;
                self.table.paid = true;
                logs.push(self.log(
                    EventKind::Payout,
                    vec![LogValue::Address(sender), LogValue::Uint(Word::from(amount))],
                ));
            }
            GameAction::Reset => {
                if matches!(self.table.status, STATE_PLAYER_TURN | STATE_DEALER_TURN) {
                    return Err("Game in progress".to_string());
                }
                self.table = Table::default();
            }
        }

        Ok(logs)
    }

    fn require_turn(&self, sender: Address) -> Result<(), String> {
        if self.table.status != STATE_PLAYER_TURN || self.table.player != sender {
            return Err("Not your turn".to_string());
        }
        Ok(())
    }

    fn finish(&mut self, result: u64) -> RawLog {
        self.table.status = STATE_FINISHED;
        self.table.result = result;
        let player = self.table.player;
        self.log(
            EventKind::GameFinished,
            vec![LogValue::Address(player), LogValue::Uint(Word::from(result))],
        )
    }
}

/// Blackjack total: face cards count 10, aces 11 unless that busts the hand.
fn hand_score(cards: &[u64]) -> u128 {
    let mut total: u128 = 0;
    let mut soft_aces = 0;
    for &card in cards {
        match card {
            1 => {
                total += 11;
                soft_aces += 1;
            }
            11..=13 => total += 10,
            other => total += u128::from(other),
        }
    }
    while total > BLACKJACK && soft_aces > 0 {
        total -= 10;
        soft_aces -= 1;
    }
    total
}

#[async_trait]
impl ContractReader for MockBlackjack {
    async fn game_state(&self) -> Result<Word, ReadError> {
        tokio::task::yield_now().await;
        let value = self.read("gameState", |t| Word::from(t.status));
        let delay = self.lock().state_read_delays.pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        value
    }

    async fn game_result(&self) -> Result<Word, ReadError> {
        tokio::task::yield_now().await;
        self.read("gameResult", |t| Word::from(t.result))
    }

    async fn player_score(&self) -> Result<Word, ReadError> {
        tokio::task::yield_now().await;
        self.read("playerScore", |t| Word::from(hand_score(&t.player_cards)))
    }

    async fn dealer_score(&self) -> Result<Word, ReadError> {
        tokio::task::yield_now().await;
        self.read("dealerScore", |t| Word::from(hand_score(&t.dealer_cards)))
    }

    async fn bet(&self) -> Result<Word, ReadError> {
        tokio::task::yield_now().await;
        self.read("bet", |t| Word::from(t.bet))
    }

    async fn player(&self) -> Result<Address, ReadError> {
        tokio::task::yield_now().await;
        self.read("player", |t| t.player)
    }

    async fn player_cards(&self) -> Result<Vec<Word>, ReadError> {
        tokio::task::yield_now().await;
        self.read("getPlayerCards", |t| {
            t.player_cards.iter().map(|c| Word::from(*c)).collect()
        })
    }

    async fn dealer_cards(&self) -> Result<Vec<Word>, ReadError> {
        tokio::task::yield_now().await;
        self.read("getDealerCards", |t| {
            t.dealer_cards.iter().map(|c| Word::from(*c)).collect()
        })
    }
}

#[async_trait]
impl ContractWriter for MockBlackjack {
    async fn submit(&self, action: GameAction) -> Result<PendingTx, WriteError> {
        let mut state = self.lock();
        if !state.available {
            return Err(TransportError::ProviderUnavailable.into());
        }
        if let Some(reason) = state.reject_next.take() {
            return Err(WriteError::Rejected(reason));
        }
        let sender = *state
            .accounts
            .first()
            .ok_or(TransportError::ProviderUnavailable)?;

        let hash = state.next_hash();
        let pending = PendingTx {
            hash,
            action,
            sender,
        };
        state.pending.insert(hash, pending.clone());
        tracing::debug!(%hash, ?action, "mock transaction submitted");
        Ok(pending)
    }

    async fn confirm(&self, pending: &PendingTx) -> Result<TxReceipt, WriteError> {
        tokio::task::yield_now().await;
        let delay = self.lock().confirm_delay.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        let pending = state
            .pending
            .remove(&pending.hash)
            .ok_or(WriteError::UnknownTransaction(pending.hash))?;

        state.block_number += 1;
        if let Some(reason) = state.revert_next.take() {
            return Err(WriteError::Reverted {
                hash: pending.hash,
                reason,
            });
        }

        let logs = state.apply(&pending).map_err(|reason| WriteError::Reverted {
            hash: pending.hash,
            reason,
        })?;
        for log in logs {
            state.broadcast(log);
        }

        Ok(TxReceipt {
            hash: pending.hash,
            block_number: state.block_number,
            gas_used: GAS_PER_CALL,
        })
    }
}

impl EventSource for MockBlackjack {
    fn subscribe(&self) -> Result<LogSubscription, TransportError> {
        let mut state = self.lock();
        if !state.available {
            return Err(TransportError::ProviderUnavailable);
        }
        if let Some(reason) = &state.subscribe_failure {
            return Err(TransportError::SubscriptionFailed(reason.clone()));
        }
        state.subscription_counter += 1;
        let id = state.subscription_counter;
        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.insert(id, tx);

        Ok(LogSubscription {
            id: SubscriptionId(id),
            logs: UnboundedReceiverStream::new(rx).boxed(),
        })
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(&id.0);
    }
}

impl GameContract for MockBlackjack {
    fn address(&self) -> Address {
        MOCK_CONTRACT_ADDRESS
    }
}

#[async_trait]
impl WalletProvider for MockBlackjack {
    async fn health_check(&self) -> Result<(), TransportError> {
        if self.lock().available {
            Ok(())
        } else {
            Err(TransportError::ProviderUnavailable)
        }
    }

    async fn accounts(&self) -> Result<Vec<Address>, TransportError> {
        self.health_check().await?;
        Ok(self.lock().accounts.clone())
    }

    async fn network(&self) -> Result<NetworkInfo, TransportError> {
        self.health_check().await?;
        Ok(self.lock().network.clone())
    }

    async fn balance(&self, address: &Address) -> Result<Wei, TransportError> {
        self.health_check().await?;
        Ok(self.balance_of(address))
    }

    fn environment_changes(&self) -> BoxStream<'static, EnvironmentChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().env_watchers.push(tx);
        UnboundedReceiverStream::new(rx).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Address {
        Address([0x11; 20])
    }

    #[test]
    fn scores_soft_aces() {
        assert_eq!(hand_score(&[1, 13]), 21);
        assert_eq!(hand_score(&[1, 1, 9]), 21);
        assert_eq!(hand_score(&[10, 12, 5]), 25);
    }

    #[tokio::test]
    async fn submitted_writes_apply_only_on_confirm() {
        let mock = MockBlackjack::new(7, vec![player()]);
        mock.queue_cards([10, 9, 7, 8]);

        let pending = mock
            .submit(GameAction::Start {
                stake: WEI_PER_ETHER,
            })
            .await
            .unwrap();
        assert_eq!(mock.game_state().await.unwrap(), Word::from(STATE_IDLE));
        assert_eq!(mock.pending_count(), 1);

        mock.confirm(&pending).await.unwrap();
        assert_eq!(mock.game_state().await.unwrap(), Word::from(STATE_PLAYER_TURN));
        assert_eq!(mock.player().await.unwrap(), player());
        assert_eq!(mock.player_cards().await.unwrap().len(), 2);
        assert_eq!(mock.balance_of(&player()), 9 * WEI_PER_ETHER);
    }

    #[tokio::test]
    async fn unavailable_provider_fails_reads_and_subscriptions() {
        let mock = MockBlackjack::new(7, vec![player()]);
        mock.set_available(false);

        assert_eq!(
            mock.game_state().await,
            Err(ReadError::Transport(TransportError::ProviderUnavailable))
        );
        assert!(matches!(
            mock.subscribe(),
            Err(TransportError::ProviderUnavailable)
        ));

        mock.set_available(true);
        mock.refuse_subscriptions(Some("filter limit".into()));
        assert!(matches!(
            mock.subscribe(),
            Err(TransportError::SubscriptionFailed(_))
        ));
        assert!(mock.game_state().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_state_read_reports_the_state_it_started_with() {
        let mock = MockBlackjack::new(7, vec![player()]);
        mock.queue_cards([10, 9, 7, 8]);
        mock.delay_state_reads([Duration::from_millis(100)]);

        let held = tokio::spawn({
            let mock = mock.clone();
            async move { mock.game_state().await }
        });
        while mock.queued_state_delays() > 0 {
            tokio::task::yield_now().await;
        }

        let pending = mock
            .submit(GameAction::Start {
                stake: WEI_PER_ETHER,
            })
            .await
            .unwrap();
        mock.confirm(&pending).await.unwrap();

        assert_eq!(held.await.unwrap().unwrap(), Word::from(STATE_IDLE));
        assert_eq!(mock.game_state().await.unwrap(), Word::from(STATE_PLAYER_TURN));
    }

    #[tokio::test]
    async fn hit_past_21_finishes_round() {
        let mock = MockBlackjack::new(7, vec![player()]);
        let mut subscription = mock.subscribe().unwrap();
        mock.queue_cards([10, 9, 5, 8, 10]);

        let start = mock.submit(GameAction::Start { stake: 1 }).await.unwrap();
        mock.confirm(&start).await.unwrap();
        let hit = mock.submit(GameAction::Hit).await.unwrap();
        mock.confirm(&hit).await.unwrap();

        let names: Vec<String> = [
            subscription.logs.next().await.unwrap(),
            subscription.logs.next().await.unwrap(),
            subscription.logs.next().await.unwrap(),
        ]
        .into_iter()
        .map(|log| log.event)
        .collect();
        assert_eq!(names, ["GameStarted", "PlayerHit", "GameFinished"]);
        assert_eq!(mock.game_result().await.unwrap(), Word::from(RESULT_DEALER_WIN));
    }

    #[tokio::test]
    async fn reverted_confirm_leaves_state_untouched() {
        let mock = MockBlackjack::new(7, vec![player()]);
        let hit = mock.submit(GameAction::Hit).await.unwrap();
        let err = mock.confirm(&hit).await.unwrap_err();
        assert!(matches!(err, WriteError::Reverted { .. }));
        assert_eq!(mock.game_state().await.unwrap(), Word::from(STATE_IDLE));
    }

    #[tokio::test]
    async fn unsubscribe_ends_stream() {
        let mock = MockBlackjack::new(7, vec![player()]);
        let mut subscription = mock.subscribe().unwrap();
        assert_eq!(mock.active_subscriptions(), 1);

        mock.unsubscribe(subscription.id);
        assert_eq!(mock.active_subscriptions(), 0);
        assert!(subscription.logs.next().await.is_none());
    }
}
