use crate::constants::CHAIN_PATH;
use ledger_core::{ChainFetcher, LedgerError, RemoteChain};
use std::time::Duration;
use tracing::debug;

/// Fetches peer chains with `GET http://<address>/chain`.
///
/// Every request is bounded by the client timeout; a timeout is reported the
/// same way as a refused connection.
#[derive(Clone, Debug)]
pub struct HttpChainFetcher {
    client: reqwest::Client,
}

impl HttpChainFetcher {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl ChainFetcher for HttpChainFetcher {
    async fn fetch_chain(&self, address: &str) -> ledger_core::Result<RemoteChain> {
        let url = format!("http://{address}{CHAIN_PATH}");
        debug!(%url, "fetching peer chain");

        let unreachable = |reason: String| LedgerError::PeerUnreachable {
            address: address.to_string(),
            reason,
        };
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        let status = res.status();
        if !status.is_success() {
            return Err(unreachable(format!("status {status}")));
        }
        res.json::<RemoteChain>()
            .await
            .map_err(|e| LedgerError::PeerDecode {
                address: address.to_string(),
                reason: e.to_string(),
            })
    }
}
