use anyhow::Result;
use blackjack_client::{Client, ClientConfig, DemoAuthority, TerminalFrontend, logging};
use client_frontend_core::FrontendConfig;
use runtime::{Runtime, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let client_config = ClientConfig::from_env();
    logging::setup_logging(
        client_config.session_id.as_deref(),
        client_config.log_dir.as_deref(),
    )?;

    let runtime_config = RuntimeConfig::from_env();
    let frontend_config = FrontendConfig::from_env();
    tracing::info!(?runtime_config, "Starting blackjack client");

    let demo = DemoAuthority::new(client_config.seed);

    let runtime = Runtime::builder()
        .config(runtime_config)
        .contract(demo.contract())
        .wallet(demo.wallet())
        .build()
        .await?;

    let frontend = TerminalFrontend::new(frontend_config, demo);

    let client = Client::builder()
        .runtime(runtime)
        .frontend(frontend)
        .build()?;

    client.run().await
}
