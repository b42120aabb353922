//! Binary-level settings read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Log subdirectory name; generated from the clock when unset.
    pub session_id: Option<String>,
    /// Overrides the platform cache directory for logs.
    pub log_dir: Option<PathBuf>,
    /// Deck seed for the demo authority.
    pub seed: u64,
}

impl ClientConfig {
    /// Environment variables:
    /// - `BLACKJACK_SESSION_ID` - Session name used for the log directory
    /// - `BLACKJACK_LOG_DIR` - Base log directory
    /// - `BLACKJACK_SEED` - Deterministic deck seed (default: clock based)
    pub fn from_env() -> Self {
        let seed = env::var("BLACKJACK_SEED")
            .ok()
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or_else(clock_seed);

        Self {
            session_id: non_empty("BLACKJACK_SESSION_ID"),
            log_dir: non_empty("BLACKJACK_LOG_DIR").map(PathBuf::from),
            seed,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
