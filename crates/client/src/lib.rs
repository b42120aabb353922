//! Top-level client orchestrating the Runtime and Frontend layers.
//!
//! # Architecture
//!
//! ```text
//! Client (Top-level container)
//!   ├─→ Runtime (sync engine against the remote authority)
//!   └─→ Frontend (UI layer, talks to the runtime via RuntimeHandle only)
//! ```
//!
//! The binary wires both to the in-memory demo authority; a real wallet and
//! contract binding only need to implement the traits from
//! `client-blockchain-core`.

mod builder;
pub mod config;
pub mod demo;
pub mod logging;
pub mod terminal;

pub use builder::ClientBuilder;
pub use config::ClientConfig;
pub use demo::DemoAuthority;
pub use terminal::TerminalFrontend;

// Re-export Frontend trait from client-frontend-core
pub use client_frontend_core::Frontend;

use anyhow::Result;

/// Top-level client container.
///
/// # Lifecycle
///
/// 1. Client::builder() receives the already-built runtime and frontend
/// 2. Client::run() transfers control to the frontend (blocking)
/// 3. On frontend exit, the runtime is shut down
pub struct Client {
    runtime: runtime::Runtime,
    frontend: Box<dyn Frontend>,
}

impl Client {
    /// Create a new ClientBuilder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run the frontend until the user quits, then stop the runtime.
    pub async fn run(self) -> Result<()> {
        let handle = self.runtime.handle();

        let mut frontend = self.frontend;
        let frontend_result = frontend.run(handle).await;

        if let Err(e) = self.runtime.shutdown().await {
            tracing::error!("Runtime shutdown failed: {}", e);
        }

        frontend_result
    }
}
