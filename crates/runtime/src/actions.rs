//! User action flows: optimistic notice, submit and confirm, then refresh.
//!
//! The controller does not serialize actions. Callers gate new actions on the
//! derived action set; two overlapping flows simply both run to completion.
use std::future::Future;
use std::time::Duration;

use client_blockchain_core::{TxReceipt, WriteError};
use game_core::{ActionKind, BUST_THRESHOLD, GameAction};
use tracing::{debug, info, warn};

use crate::api::{Result, RuntimeError};
use crate::client::RemoteStateClient;
use crate::events::{Notice, StatusEvent};
use crate::subscription::GameEvent;

/// Work the driver schedules after an action or a remote event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Full refresh right away.
    Refresh,
    /// Full refresh after a delay.
    RefreshAfter(Duration),
    /// Read state and result after a delay and restore the derived status.
    RestoreStatusAfter(Duration),
    /// Re-read the wallet summary.
    RefreshWallet,
}

/// Status updates and follow-ups produced by one step.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub status: Vec<StatusEvent>,
    pub follow_ups: Vec<FollowUp>,
}

pub struct ActionLifecycleController {
    client: RemoteStateClient,
    error_fallback: Duration,
    bust_follow_up: Duration,
}

impl ActionLifecycleController {
    pub fn new(client: RemoteStateClient, error_fallback: Duration, bust_follow_up: Duration) -> Self {
        Self {
            client,
            error_fallback,
            bust_follow_up,
        }
    }

    /// Optimistic notice shown before anything is sent.
    pub fn begin(&self, action: &GameAction) -> StatusEvent {
        debug!(action = %action.kind(), "action started");
        StatusEvent::Notice(Notice::ActionPending(action.kind()))
    }

    /// Submit and wait for confirmation.
    ///
    /// The returned future owns its client, so it can outlive the borrow of
    /// the controller. Confirmation has no local timeout. Write failures come
    /// back as [`RuntimeError::ActionRejected`].
    pub fn execute(
        &self,
        action: GameAction,
    ) -> impl Future<Output = Result<TxReceipt>> + Send + 'static {
        let client = self.client.clone();
        let kind = action.kind();
        async move {
            let written = async {
                let pending = client.submit(action).await?;
                debug!(hash = %pending.hash, action = %kind, "transaction submitted");
                client.confirm(&pending).await
            };
            written
                .await
                .map_err(|source| RuntimeError::ActionRejected { action: kind, source })
        }
    }

    /// Status and follow-ups once the write settled.
    ///
    /// A refresh is always scheduled, whatever the outcome.
    pub fn complete(&self, action: &GameAction, result: &Result<TxReceipt>) -> Reaction {
        let kind = action.kind();
        let mut reaction = Reaction {
            follow_ups: vec![FollowUp::Refresh],
            ..Reaction::default()
        };

        match result {
            Ok(receipt) => {
                info!(
                    action = %kind,
                    hash = %receipt.hash,
                    block = receipt.block_number,
                    "action confirmed"
                );
                reaction
                    .status
                    .push(StatusEvent::Notice(Notice::ActionConfirmed(kind)));
                if matches!(kind, ActionKind::Start | ActionKind::Payout) {
                    reaction.follow_ups.push(FollowUp::RefreshWallet);
                }
            }
            Err(error) => {
                warn!(action = %kind, %error, "action failed");
                reaction.status.push(StatusEvent::ActionFailed {
                    action: kind,
                    reason: failure_reason(error),
                });
                reaction
                    .follow_ups
                    .push(FollowUp::RestoreStatusAfter(self.error_fallback));
            }
        }

        reaction
    }

    /// Status and follow-ups for a remote event.
    ///
    /// Every event, malformed ones included, schedules a full refresh.
    pub fn on_event(&self, event: &GameEvent) -> Reaction {
        let mut reaction = Reaction {
            follow_ups: vec![FollowUp::Refresh],
            ..Reaction::default()
        };

        let notice = match event {
            GameEvent::Started { player, bet } => Some(Notice::GameStarted {
                player: *player,
                bet: *bet,
            }),
            GameEvent::PlayerDraw { card, total } => {
                if *total > BUST_THRESHOLD {
                    reaction.status.push(StatusEvent::BustAdvisory { total: *total });
                    reaction.follow_ups.extend([
                        FollowUp::RefreshAfter(self.bust_follow_up),
                        FollowUp::RestoreStatusAfter(self.error_fallback),
                    ]);
                }
                Some(Notice::PlayerDrew {
                    card: *card,
                    total: *total,
                })
            }
            GameEvent::DealerDraw { card, total } => Some(Notice::DealerDrew {
                card: *card,
                total: *total,
            }),
            GameEvent::Finished { outcome, .. } => Some(Notice::GameFinished { outcome: *outcome }),
            GameEvent::Payout { amount, .. } => {
                reaction.follow_ups.push(FollowUp::RefreshWallet);
                Some(Notice::PayoutReceived { amount: *amount })
            }
            GameEvent::Malformed { .. } => None,
        };

        if let Some(notice) = notice {
            // The advisory, when present, stays last on the status line.
            reaction.status.insert(0, StatusEvent::Notice(notice));
        }
        reaction
    }
}

fn failure_reason(error: &RuntimeError) -> String {
    match error {
        RuntimeError::ActionRejected {
            source: WriteError::Rejected(reason) | WriteError::Reverted { reason, .. },
            ..
        } => reason.clone(),
        RuntimeError::ActionRejected { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use client_blockchain_core::{MockBlackjack, TxHash};
    use game_core::{Address, Card, GameOutcome};

    fn controller() -> ActionLifecycleController {
        let mock = MockBlackjack::new(1, vec![Address([1; 20])]);
        ActionLifecycleController::new(
            RemoteStateClient::new(Arc::new(mock)),
            Duration::from_secs(3),
            Duration::from_secs(1),
        )
    }

    #[test]
    fn failure_schedules_refresh_and_status_fallback() {
        let controller = controller();
        let result = Err(RuntimeError::ActionRejected {
            action: ActionKind::Hit,
            source: WriteError::Reverted {
                hash: TxHash([0; 32]),
                reason: "Not your turn".to_string(),
            },
        });

        let reaction = controller.complete(&GameAction::Hit, &result);
        assert_eq!(
            reaction.status,
            vec![StatusEvent::ActionFailed {
                action: ActionKind::Hit,
                reason: "Not your turn".to_string(),
            }]
        );
        assert_eq!(
            reaction.follow_ups,
            vec![
                FollowUp::Refresh,
                FollowUp::RestoreStatusAfter(Duration::from_secs(3))
            ]
        );
    }

    #[test]
    fn confirmed_payout_refreshes_state_and_wallet() {
        let controller = controller();
        let receipt = TxReceipt {
            hash: TxHash([1; 32]),
            block_number: 9,
            gas_used: 21_000,
        };

        let reaction = controller.complete(&GameAction::ClaimPayout, &Ok(receipt));
        assert_eq!(
            reaction.follow_ups,
            vec![FollowUp::Refresh, FollowUp::RefreshWallet]
        );
    }

    #[test]
    fn bust_draw_raises_advisory_with_delayed_refresh() {
        let controller = controller();
        let reaction = controller.on_event(&GameEvent::PlayerDraw {
            card: Card::from_code(10),
            total: 25,
        });

        assert_eq!(
            reaction.status,
            vec![
                StatusEvent::Notice(Notice::PlayerDrew {
                    card: Card::from_code(10),
                    total: 25,
                }),
                StatusEvent::BustAdvisory { total: 25 },
            ]
        );
        assert_eq!(
            reaction.follow_ups,
            vec![
                FollowUp::Refresh,
                FollowUp::RefreshAfter(Duration::from_secs(1)),
                FollowUp::RestoreStatusAfter(Duration::from_secs(3)),
            ]
        );
    }

    #[test]
    fn every_event_triggers_a_refresh() {
        let controller = controller();
        let player = Address([2; 20]);
        let events = [
            GameEvent::Started { player, bet: 5 },
            GameEvent::PlayerDraw {
                card: Card::from_code(3),
                total: 12,
            },
            GameEvent::DealerDraw {
                card: Card::from_code(3),
                total: 12,
            },
            GameEvent::Finished {
                player,
                outcome: GameOutcome::Push,
            },
            GameEvent::Payout { player, amount: 5 },
            GameEvent::Malformed {
                event: "Nope".to_string(),
                reason: "unknown event".to_string(),
            },
        ];

        for event in &events {
            assert_eq!(controller.on_event(event).follow_ups[0], FollowUp::Refresh);
        }
    }

    #[tokio::test]
    async fn execute_confirms_against_the_authority() {
        let mock = MockBlackjack::new(1, vec![Address([1; 20])]);
        let controller = ActionLifecycleController::new(
            RemoteStateClient::new(Arc::new(mock.clone())),
            Duration::from_secs(3),
            Duration::from_secs(1),
        );

        let receipt = controller.execute(GameAction::Start { stake: 10 }).await;
        assert!(receipt.is_ok());
        assert_eq!(mock.pending_count(), 0);

        let rejected = controller.execute(GameAction::Start { stake: 10 }).await;
        assert!(matches!(
            rejected,
            Err(RuntimeError::ActionRejected {
                action: ActionKind::Start,
                source: WriteError::Reverted { .. },
            })
        ));

        mock.set_available(false);
        let unavailable = controller.execute(GameAction::Hit).await;
        let Err(err) = unavailable else {
            panic!("write without a provider must fail");
        };
        assert!(!err.is_fatal());
        assert_eq!(
            failure_reason(&err),
            "transport error: no wallet provider available"
        );
    }
}
