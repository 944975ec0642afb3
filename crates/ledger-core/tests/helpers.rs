#![allow(dead_code)]

use ledger_core::{Block, ChainFetcher, Ledger, LedgerError, LedgerService, RemoteChain};
use std::collections::HashMap;
use std::sync::Mutex;

/// A fresh ledger extended by mining until it holds `len` blocks.
pub fn ledger_with_blocks(len: usize, miner: &str) -> Ledger {
    let ledger = Ledger::new();
    while ledger.len() < len {
        ledger.mine(miner).expect("mining on a fresh ledger");
    }
    ledger
}

pub fn chain_with_blocks(len: usize, miner: &str) -> Vec<Block> {
    ledger_with_blocks(len, miner).chain()
}

pub enum PeerResponse {
    Chain(RemoteChain),
    Unreachable,
    Undecodable,
}

/// In-memory stand-in for the HTTP chain fetcher, keyed by normalized address.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, PeerResponse>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(self, address: &str, chain: Vec<Block>) -> Self {
        self.with_remote(address, RemoteChain::from(chain))
    }

    pub fn with_remote(mut self, address: &str, remote: RemoteChain) -> Self {
        self.responses
            .insert(address.to_string(), PeerResponse::Chain(remote));
        self
    }

    pub fn with_unreachable(mut self, address: &str) -> Self {
        self.responses
            .insert(address.to_string(), PeerResponse::Unreachable);
        self
    }

    pub fn with_undecodable(mut self, address: &str) -> Self {
        self.responses
            .insert(address.to_string(), PeerResponse::Undecodable);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ChainFetcher for MockFetcher {
    async fn fetch_chain(&self, address: &str) -> ledger_core::Result<RemoteChain> {
        self.fetched.lock().unwrap().push(address.to_string());
        match self.responses.get(address) {
            Some(PeerResponse::Chain(remote)) => Ok(remote.clone()),
            Some(PeerResponse::Undecodable) => Err(LedgerError::PeerDecode {
                address: address.to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            }),
            Some(PeerResponse::Unreachable) | None => Err(LedgerError::PeerUnreachable {
                address: address.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}
