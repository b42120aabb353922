//! Line commands accepted by the terminal frontend.
use std::str::FromStr;

use game_core::ActionKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// A contract action; `stake` only applies to `start`.
    Action {
        kind: ActionKind,
        stake: Option<String>,
    },
    Refresh,
    /// Switch to demo account `n` (1-based).
    Account(usize),
    Chain {
        chain_id: u64,
        name: String,
    },
    Disconnect,
    Connect,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
Commands:
  start [stake]      start a round (stake in ETH)
  hit | stand        play your hand
  payout             claim winnings
  reset              clear the table
  refresh            re-read contract state
  account <n>        switch wallet account
  chain <id> <name>  switch network
  disconnect         lock the wallet
  connect            unlock the wallet and reconnect
  help | quit";

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Input::Empty);
        };
        let args: Vec<&str> = words.collect();

        match command.to_ascii_lowercase().as_str() {
            "refresh" => Ok(Input::Refresh),
            "disconnect" => Ok(Input::Disconnect),
            "connect" => Ok(Input::Connect),
            "help" | "?" => Ok(Input::Help),
            "quit" | "exit" | "q" => Ok(Input::Quit),
            "account" => match args.as_slice() {
                [n] => n
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Input::Account)
                    .ok_or(InputError::Usage("account <n>")),
                _ => Err(InputError::Usage("account <n>")),
            },
            "chain" => match args.as_slice() {
                [id, name @ ..] if !name.is_empty() => {
                    let chain_id = id.parse().map_err(|_| InputError::Usage("chain <id> <name>"))?;
                    Ok(Input::Chain {
                        chain_id,
                        name: name.join(" "),
                    })
                }
                _ => Err(InputError::Usage("chain <id> <name>")),
            },
            other => {
                let kind = ActionKind::from_str(other)
                    .map_err(|_| InputError::Unknown(other.to_string()))?;
                let stake = match (kind, args.as_slice()) {
                    (ActionKind::Start, []) => None,
                    (ActionKind::Start, [stake]) => Some(stake.to_string()),
                    (ActionKind::Start, _) => return Err(InputError::Usage("start [stake]")),
                    (_, []) => None,
                    (_, _) => return Err(InputError::Unknown(line.trim().to_string())),
                };
                Ok(Input::Action { kind, stake })
            }
        }
    }
}
