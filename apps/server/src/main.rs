use {anyhow::Result, clap::Parser};

use {probot_config::RelayConfig, probot_gateway::state::GatewayState};

/// WebSocket-to-HTTP relay for the ProBot chat endpoint.
///
/// Serves a chat landing page and a `/ws` socket; every user message becomes
/// one GET against the configured bot API, and the reply is relayed back.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the env filter so RUST_LOG set there is honored.
    // A missing file is not an error.
    let dotenv_path = dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let args = Args::parse();

    let config = RelayConfig::from_env();
    let state = GatewayState::from_config(config)?;

    probot_gateway::server::start(&args.bind, args.port, state).await
}
