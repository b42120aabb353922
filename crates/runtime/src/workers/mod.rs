//! Worker tasks that back the runtime orchestration.
//!
//! The sync worker is the single cooperative flow that owns the session and
//! interleaves commands, remote events, environment changes and timers.

mod sync;

pub(crate) use sync::{Command, SyncWorker};
