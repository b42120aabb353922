//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration and remote access.

pub mod errors;
pub mod handle;

pub use errors::{ErrorSeverity, Result, RuntimeError};
pub use handle::{RuntimeHandle, SessionInfo};
