use crate::chain::valid_chain;
use crate::error::{LedgerError, Result};
use crate::Block;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// The document a peer serves at `/chain`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteChain {
    pub length: usize,
    pub chain: Vec<Block>,
}

impl From<Vec<Block>> for RemoteChain {
    fn from(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }
}

/// Transport used to ask a peer for its chain. Implementations should bound
/// each request with a timeout and report every transport or decode failure as
/// an error; the resolver skips that peer.
pub trait ChainFetcher: Send + Sync {
    fn fetch_chain(&self, address: &str) -> impl Future<Output = Result<RemoteChain>> + Send;
}

/// Checks a fetched chain before it can be considered for adoption.
pub fn vet_remote_chain(address: &str, remote: RemoteChain) -> Result<Vec<Block>> {
    if remote.length != remote.chain.len() {
        debug!(
            peer = address,
            reported = remote.length,
            actual = remote.chain.len(),
            "reported length does not match chain"
        );
        return Err(LedgerError::InvalidForeignChain {
            address: address.to_string(),
        });
    }
    if !valid_chain(&remote.chain) {
        return Err(LedgerError::InvalidForeignChain {
            address: address.to_string(),
        });
    }
    Ok(remote.chain)
}

/// Scans `peers` and returns the longest valid chain strictly longer than
/// `local_len`, with the address that served it.
///
/// A peer has to strictly beat the best length seen so far, so among equally
/// long winners the one scanned first is kept. Unreachable peers and invalid
/// chains are skipped.
pub async fn longest_valid_chain<F: ChainFetcher>(
    fetcher: &F,
    peers: &[String],
    local_len: usize,
) -> Option<(String, Vec<Block>)> {
    let mut best_len = local_len;
    let mut best = None;

    for address in peers {
        let remote = match fetcher.fetch_chain(address).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(peer = %address, error = %err, "skipping peer");
                continue;
            }
        };
        if remote.length <= best_len {
            debug!(peer = %address, length = remote.length, best_len, "peer chain not longer");
            continue;
        }
        match vet_remote_chain(address, remote) {
            Ok(chain) => {
                best_len = chain.len();
                best = Some((address.clone(), chain));
            }
            Err(err) => warn!(peer = %address, error = %err, "rejecting peer chain"),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::genesis_block;
    use crate::pow::proof_of_work;

    fn chain_of(len: usize) -> Vec<Block> {
        let mut chain = vec![genesis_block(1)];
        while chain.len() < len {
            let prev = chain.last().unwrap();
            chain.push(Block {
                index: prev.index + 1,
                timestamp: prev.timestamp,
                transactions: vec![],
                proof: proof_of_work(prev.proof),
                previous_hash: prev.hash(),
            });
        }
        chain
    }

    #[test]
    fn vet_accepts_consistent_chain() {
        let chain = chain_of(3);
        let vetted = vet_remote_chain("peer", RemoteChain::from(chain.clone())).unwrap();
        assert_eq!(vetted, chain);
    }

    #[test]
    fn vet_rejects_length_mismatch() {
        let remote = RemoteChain {
            length: 9,
            chain: chain_of(2),
        };
        assert!(matches!(
            vet_remote_chain("peer", remote),
            Err(LedgerError::InvalidForeignChain { .. })
        ));
    }

    #[test]
    fn vet_rejects_broken_linkage() {
        let mut chain = chain_of(3);
        chain[2].previous_hash = "deadbeef".to_string();
        assert!(matches!(
            vet_remote_chain("peer", RemoteChain::from(chain)),
            Err(LedgerError::InvalidForeignChain { .. })
        ));
    }

    #[test]
    fn remote_chain_json_shape() {
        let remote = RemoteChain::from(chain_of(1));
        let value = serde_json::to_value(&remote).unwrap();
        assert_eq!(value["length"], 1);
        assert_eq!(value["chain"][0]["proof"], 100);
        assert_eq!(value["chain"][0]["previous_hash"], "1");
    }
}
