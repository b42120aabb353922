//! Local demo authority and the wallet controls the terminal exposes.
use std::sync::Arc;

use client_blockchain_core::{GameContract, MockBlackjack, WalletProvider};
use game_core::{Address, NetworkInfo};

/// Number of funded demo accounts.
pub const DEMO_ACCOUNTS: usize = 3;

/// In-memory contract plus the wallet it is hosted in.
#[derive(Clone)]
pub struct DemoAuthority {
    mock: MockBlackjack,
    accounts: Vec<Address>,
}

impl DemoAuthority {
    pub fn new(seed: u64) -> Self {
        let accounts: Vec<Address> = (1..=DEMO_ACCOUNTS as u8)
            .map(|n| {
                let mut bytes = [0u8; Address::LEN];
                bytes[0] = 0xd0;
                bytes[Address::LEN - 1] = n;
                Address::from_bytes(bytes)
            })
            .collect();
        let mock = MockBlackjack::new(seed, accounts.clone());
        tracing::info!(seed, accounts = accounts.len(), "demo authority ready");

        Self { mock, accounts }
    }

    pub fn contract(&self) -> Arc<dyn GameContract> {
        Arc::new(self.mock.clone())
    }

    pub fn wallet(&self) -> Arc<dyn WalletProvider> {
        Arc::new(self.mock.clone())
    }

    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Make account `index` (0-based) the active one.
    pub fn select_account(&self, index: usize) -> Option<Address> {
        let account = *self.accounts.get(index)?;
        self.mock.set_accounts(vec![account]);
        Some(account)
    }

    pub fn switch_chain(&self, network: NetworkInfo) {
        self.mock.switch_chain(network);
    }

    /// Lock the wallet: it reports no accounts.
    pub fn disconnect(&self) {
        self.mock.set_accounts(Vec::new());
    }

    /// Unlock the wallet with every demo account, first one active.
    pub fn connect(&self) {
        self.mock.set_accounts(self.accounts.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accounts_are_distinct_and_funded() {
        let demo = DemoAuthority::new(1);
        let wallet = demo.wallet();
        assert_eq!(demo.accounts().len(), DEMO_ACCOUNTS);
        for account in demo.accounts() {
            assert!(wallet.balance(account).await.unwrap() > 0);
        }
        assert!(demo.select_account(DEMO_ACCOUNTS).is_none());
    }
}
