use crate::error::{LedgerError, Result};
use std::collections::BTreeSet;
use url::Url;

/// Reduce a peer address to the `host[:port]` form used as its identity.
///
/// Anything after the authority (path, query, trailing slash) is dropped.
/// Peers are dialed over plain `http://`, so only port 80 is elided; any other
/// scheme keeps its port, explicit or default. Addresses without a scheme are
/// read as `http://`.
pub fn parse_peer_address(address: &str) -> Result<String> {
    let invalid = || LedgerError::InvalidAddress(address.to_string());
    let trimmed = address.trim();
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{trimmed}"))
    }
    .map_err(|_| invalid())?;

    let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
    let port = if url.scheme() == "http" {
        url.port()
    } else {
        url.port_or_known_default()
    };
    Ok(match port {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Known peers, keyed by normalized address. Only ever grows.
#[derive(Clone, Debug, Default)]
pub struct PeerSet {
    peers: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(false)` when the normalized address is already known.
    pub fn insert(&mut self, address: &str) -> Result<bool> {
        let host = parse_peer_address(address)?;
        Ok(self.peers.insert(host))
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }
}
