#![allow(dead_code)]

use axum::Router;
use ledger_core::{Ledger, LedgerService};
use ledger_node::{router, AppState, HttpChainFetcher};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Start a node around `ledger` and return its address.
pub async fn spawn_node(ledger: Arc<Ledger>, node_id: &str) -> anyhow::Result<SocketAddr> {
    let fetcher = Arc::new(HttpChainFetcher::new(TEST_TIMEOUT)?);
    serve(router(AppState::new(ledger, fetcher, node_id))).await
}

pub fn ledger_with_blocks(len: usize, miner: &str) -> Arc<Ledger> {
    let ledger = Ledger::new();
    while ledger.len() < len {
        ledger.mine(miner).expect("mining on a fresh ledger");
    }
    Arc::new(ledger)
}

/// An address nothing listens on.
pub async fn closed_addr() -> anyhow::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}
