//! Per-identity session context.
//!
//! Holds everything that is only valid for one identity on one network: the
//! current snapshot, the live log subscription, and the epoch used to discard
//! work that finished after the session was torn down.
use std::sync::Arc;

use client_blockchain_core::{GameContract, WalletProvider};
use game_core::{Address, GameSnapshot, NetworkInfo};
use tracing::{debug, info};

use crate::api::{Result, RuntimeError, SessionInfo};
use crate::subscription::{EventSubscriptionManager, GameEventStream};

pub struct Session {
    epoch: u64,
    identity: Option<Address>,
    network: Option<NetworkInfo>,
    snapshot: Option<Arc<GameSnapshot>>,
    subscriptions: EventSubscriptionManager,
}

impl Session {
    pub fn new(contract: Arc<dyn GameContract>) -> Self {
        Self {
            epoch: 0,
            identity: None,
            network: None,
            snapshot: None,
            subscriptions: EventSubscriptionManager::new(contract),
        }
    }

    /// Resolve identity and network, then open the log subscription.
    ///
    /// A live session is torn down first. On failure the session stays
    /// disconnected.
    pub async fn initialize(
        &mut self,
        wallet: &dyn WalletProvider,
    ) -> Result<(SessionInfo, GameEventStream)> {
        if self.is_connected() {
            self.teardown();
        }

        wallet
            .health_check()
            .await
            .map_err(|e| RuntimeError::NoProvider(e.to_string()))?;
        let address = wallet
            .accounts()
            .await
            .map_err(|e| RuntimeError::NoProvider(e.to_string()))?
            .first()
            .copied()
            .ok_or_else(|| RuntimeError::NoProvider("no account available".to_string()))?;
        let network = wallet
            .network()
            .await
            .map_err(|e| RuntimeError::NoProvider(e.to_string()))?;

        let events = self
            .subscriptions
            .subscribe()
            .map_err(RuntimeError::Subscription)?;

        info!(
            epoch = self.epoch,
            %address,
            network = %network.name,
            chain_id = network.chain_id,
            "session initialized"
        );
        self.identity = Some(address);
        self.network = Some(network.clone());

        Ok((
            SessionInfo {
                epoch: self.epoch,
                address,
                network,
            },
            events,
        ))
    }

    /// Drop the snapshot and subscription and start a new epoch.
    pub fn teardown(&mut self) {
        self.subscriptions.teardown();
        self.snapshot = None;
        self.identity = None;
        self.network = None;
        self.epoch += 1;
        debug!(epoch = self.epoch, "session torn down");
    }

    /// Replace the current snapshot if `epoch` is still current.
    ///
    /// Returns the new snapshot, or `None` when the result is stale.
    pub fn apply(&mut self, epoch: u64, snapshot: GameSnapshot) -> Option<Arc<GameSnapshot>> {
        if !self.accepts(epoch) {
            return None;
        }
        let snapshot = Arc::new(snapshot);
        self.snapshot = Some(Arc::clone(&snapshot));
        Some(snapshot)
    }

    /// Whether work started at `epoch` may still touch this session.
    pub fn accepts(&self, epoch: u64) -> bool {
        self.epoch == epoch && self.is_connected()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_connected(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<Address> {
        self.identity
    }

    pub fn network(&self) -> Option<&NetworkInfo> {
        self.network.as_ref()
    }

    pub fn snapshot(&self) -> Option<Arc<GameSnapshot>> {
        self.snapshot.clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_blockchain_core::{MockBlackjack, TransportError};

    fn player() -> Address {
        Address([5; 20])
    }

    #[tokio::test]
    async fn initialize_resolves_identity_and_subscribes() {
        let mock = MockBlackjack::new(1, vec![player()]);
        let mut session = Session::new(Arc::new(mock.clone()));

        let (info, _events) = session.initialize(&mock).await.unwrap();
        assert_eq!(info.address, player());
        assert_eq!(info.network.chain_id, 31337);
        assert!(session.is_subscribed());
        assert_eq!(mock.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn locked_wallet_is_fatal() {
        let mock = MockBlackjack::new(1, vec![]);
        let mut session = Session::new(Arc::new(mock.clone()));

        let Err(err) = session.initialize(&mock).await else {
            panic!("a locked wallet must not start a session");
        };
        assert!(matches!(err, RuntimeError::NoProvider(_)));
        assert!(err.is_fatal());
        assert!(!session.is_connected());
        assert_eq!(mock.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn refused_subscription_is_fatal() {
        let mock = MockBlackjack::new(1, vec![player()]);
        mock.refuse_subscriptions(Some("filter limit".into()));
        let mut session = Session::new(Arc::new(mock.clone()));

        let Err(err) = session.initialize(&mock).await else {
            panic!("a refused subscription must not start a session");
        };
        assert!(matches!(
            err,
            RuntimeError::Subscription(TransportError::SubscriptionFailed(ref reason)) if reason == "filter limit"
        ));
        assert!(err.is_fatal());
        assert!(!session.is_connected());

        mock.refuse_subscriptions(None);
        assert!(session.initialize(&mock).await.is_ok());
        assert_eq!(mock.active_subscriptions(), 1);
    }

    #[tokio::test]
    async fn stale_epochs_are_discarded_after_teardown() {
        let mock = MockBlackjack::new(1, vec![player()]);
        let mut session = Session::new(Arc::new(mock.clone()));
        let (info, _events) = session.initialize(&mock).await.unwrap();

        assert!(session.apply(info.epoch, GameSnapshot::idle()).is_some());
        assert!(session.snapshot().is_some());

        session.teardown();
        assert!(session.snapshot().is_none());
        assert_eq!(mock.active_subscriptions(), 0);

        let (next, _events) = session.initialize(&mock).await.unwrap();
        assert!(next.epoch > info.epoch);
        assert!(session.apply(info.epoch, GameSnapshot::idle()).is_none());
        assert!(session.apply(next.epoch, GameSnapshot::idle()).is_some());
    }

    #[tokio::test]
    async fn reinitializing_replaces_the_subscription() {
        let mock = MockBlackjack::new(1, vec![player()]);
        let mut session = Session::new(Arc::new(mock.clone()));
        let (first, _a) = session.initialize(&mock).await.unwrap();
        let (second, _b) = session.initialize(&mock).await.unwrap();

        assert_ne!(first.epoch, second.epoch);
        assert_eq!(mock.active_subscriptions(), 1);
    }
}
