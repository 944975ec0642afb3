use clap::Parser;
use ledger_core::{Ledger, LedgerService};
use ledger_node::{
    constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_LISTEN},
    router, AppState, HttpChainFetcher,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Identity credited with mining rewards (random UUID when omitted)
    #[arg(long)]
    node_id: Option<String>,

    /// Peer to register at startup, e.g. http://127.0.0.1:5001 (repeatable)
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Timeout for each peer chain request during conflict resolution
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS)]
    fetch_timeout_ms: u64,

    /// Search proofs on all cores
    #[arg(long)]
    parallel_mining: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let node_id = args
        .node_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());

    let ledger = Arc::new(Ledger::new().with_parallel_mining(args.parallel_mining));
    for peer in &args.peers {
        if !ledger.register_node(peer) {
            warn!(peer = %peer, "startup peer not registered");
        }
    }
    let fetcher = Arc::new(HttpChainFetcher::new(Duration::from_millis(
        args.fetch_timeout_ms,
    ))?);

    let app = router(AppState::new(ledger, fetcher, &node_id)).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = args.listen.parse()?;
    info!(%node_id, "ledger-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
