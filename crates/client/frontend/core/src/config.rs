//! Frontend configuration structures and loaders.
//!
//! This module contains UI-specific configuration that is shared across
//! different frontend implementations.

use std::env;
use std::time::Duration;

/// Frontend-specific configuration.
#[derive(Clone, Debug)]
pub struct FrontendConfig {
    pub messages: MessageConfig,
    /// Stake offered when `start` is issued without an amount.
    pub default_stake: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            messages: MessageConfig::default(),
            default_stake: "0.01".to_string(),
        }
    }
}

impl FrontendConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BLACKJACK_MESSAGE_CAPACITY` - Message log capacity (default: 64)
    /// - `BLACKJACK_NOTICE_TTL_MS` - How long a notice stays visible (default: 5000)
    /// - `BLACKJACK_DEFAULT_STAKE` - Stake in ether for a bare `start` (default: 0.01)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("BLACKJACK_MESSAGE_CAPACITY") {
            config.messages.capacity = capacity.max(1);
        }
        if let Some(ms) = read_env::<u64>("BLACKJACK_NOTICE_TTL_MS") {
            config.messages.notice_ttl = Duration::from_millis(ms);
        }
        if let Ok(stake) = env::var("BLACKJACK_DEFAULT_STAKE")
            && !stake.trim().is_empty()
        {
            config.default_stake = stake.trim().to_string();
        }

        config
    }
}

#[derive(Clone, Debug)]
pub struct MessageConfig {
    pub capacity: usize,
    pub notice_ttl: Duration,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            notice_ttl: Duration::from_millis(5000),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
