//! Entry point every presentation layer implements.
use anyhow::Result;
use async_trait::async_trait;
use runtime::RuntimeHandle;

/// A UI that drives one blackjack session through a [`RuntimeHandle`].
///
/// The frontend never owns the runtime. It should subscribe to the topics it
/// renders before calling [`RuntimeHandle::connect`], so the `Connected` or
/// `Fatal` session event is not missed, and gate player input on the
/// [`ActionSet`](crate::ActionSet) derived from the latest snapshot.
///
/// ```no_run
/// use async_trait::async_trait;
/// use client_frontend_core::{EventConsumer, Frontend, MessageConfig, ScreenState};
/// use runtime::{RuntimeHandle, Topic};
///
/// struct Headless;
///
/// #[async_trait]
/// impl Frontend for Headless {
///     async fn run(&mut self, handle: RuntimeHandle) -> anyhow::Result<()> {
///         let mut snapshots = handle.subscribe(Topic::Snapshot);
///         let mut screen = ScreenState::new(&MessageConfig::default());
///         handle.connect().await?;
///
///         while let Ok(event) = snapshots.recv().await {
///             screen.on_event(&event);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Frontend: Send {
    /// Returns when the player quits; an error ends the process.
    async fn run(&mut self, handle: RuntimeHandle) -> Result<()>;
}
