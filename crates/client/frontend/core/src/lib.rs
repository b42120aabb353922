//! Cross-frontend primitives for presenting the game.
//!
//! Houses the view-model derivation, display text, message logging and event
//! handling that both the terminal client and future graphical clients reuse.
pub mod config;
pub mod event;
pub mod format;
pub mod frontend;
pub mod message;
pub mod screen;
pub mod view_model;

pub use config::{FrontendConfig, MessageConfig};
pub use event::{EventConsumer, EventImpact};
pub use frontend::Frontend;
pub use message::{MessageEntry, MessageLevel, MessageLog};
pub use screen::{Frame, ScreenState, WalletView};
pub use view_model::{
    ActionSet, CardView, GameView, ResultBanner, StatusLine, StatusTone, ViewModelDeriver,
};
