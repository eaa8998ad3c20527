// infradash - Runtime-portable OpenAI-compatible proxy for the DeepInfra inference API
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use infradash::cli::Args;
use infradash::config::AppConfig;
use infradash::dispatch::{AuthConfig, ProxyState};
use infradash::relay::UpstreamRelay;
use infradash::runtime::{self, RuntimeKind};
use infradash::utils::logging;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments (help/version surface only)
    let _args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting infradash v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Classify the host runtime
    let Some(kind) = RuntimeKind::detect() else {
        error!("Unsupported host runtime");
        error!(
            "Run under a supported invoker (LISTEN_FDS, K_SERVICE, SERVER_SOFTWARE) \
             or set INFRADASH_RUNTIME=edge|standalone|socket"
        );
        return Ok(());
    };
    info!("Detected host runtime: {kind}");

    if config.token.is_none() {
        info!("TOKEN not set; authentication is disabled");
    }

    // Phase 4: Build the shared proxy state
    let state = Arc::new(ProxyState {
        runtime: kind,
        auth: AuthConfig {
            token: config.token.clone(),
        },
        relay: UpstreamRelay::new(&config.upstream)?,
    });

    // Phase 5: Hand off to the selected runtime adapter
    match kind {
        RuntimeKind::EdgeWorker => runtime::edge::run(state, &config).await?,
        RuntimeKind::Standalone => runtime::standalone::run(state, &config).await?,
        RuntimeKind::SocketServer => runtime::socket::run(state, &config).await?,
    }

    info!("Server shut down gracefully");
    Ok(())
}
