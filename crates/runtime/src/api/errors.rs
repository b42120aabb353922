//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the remote authority, the reconciler, and the driver
//! channels so clients can bubble them up with consistent context.
use client_blockchain_core::{ReadError, TransportError, WriteError};
use game_core::ActionKind;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::reconciler::ReconcileError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No reachable provider, contract or account. Fatal to session start.
    #[error("no wallet provider available: {0}")]
    NoProvider(String),

    #[error("no active session; connect a wallet first")]
    NotConnected,

    #[error("{action} action failed")]
    ActionRejected {
        action: ActionKind,
        #[source]
        source: WriteError,
    },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("log subscription failed")]
    Subscription(#[source] TransportError),

    #[error("runtime requires a {0} before building")]
    MissingCollaborator(&'static str),

    #[error("runtime command channel closed")]
    CommandChannelClosed,

    #[error("runtime reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("sync worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

/// How a failure affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The session cannot start; the UI keeps a persistent banner.
    Fatal,
    /// Transient; the next event, timer or action retries.
    Recoverable,
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::NoProvider(_)
            | RuntimeError::Subscription(_)
            | RuntimeError::MissingCollaborator(_)
            | RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_) => ErrorSeverity::Fatal,
            RuntimeError::NotConnected
            | RuntimeError::ActionRejected { .. }
            | RuntimeError::Read(_)
            | RuntimeError::Reconcile(_) => ErrorSeverity::Recoverable,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }
}
