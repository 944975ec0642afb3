use crate::chain::{genesis_block, valid_chain};
use crate::consensus::{longest_valid_chain, ChainFetcher};
use crate::constants::{MINING_REWARD, MINING_REWARD_SENDER, PARALLEL_POW_WINDOW};
use crate::error::{LedgerError, Result};
use crate::mine::proof_of_work_parallel;
use crate::peers::PeerSet;
use crate::{pow, unix_nanos, Block, Transaction};
use parking_lot::RwLock;
use std::future::Future;
use tracing::{debug, info, warn};

/// Operations a node exposes over its ledger.
pub trait LedgerService {
    /// Register a peer; `false` if it was already known or the address is invalid.
    fn register_node(&self, address: &str) -> bool;

    fn valid_chain(&self, chain: &[Block]) -> bool;

    /// Adopt the longest valid peer chain if it is strictly longer than ours.
    fn resolve_conflicts<F: ChainFetcher>(&self, fetcher: &F) -> impl Future<Output = bool> + Send;

    /// Seal the pending pool into a new block. An empty or missing
    /// `previous_hash` links to the current last block.
    fn new_block(&self, proof: u64, previous_hash: Option<&str>) -> Result<Block>;

    /// Queue a transaction; returns the index of the block it should land in.
    fn new_transaction(&self, tx: Transaction) -> Result<u64>;

    fn last_block(&self) -> Result<Block>;

    fn proof_of_work(&self, last_proof: u64) -> u64;

    fn verify_proof(&self, last_proof: u64, proof: u64) -> bool;

    /// Find a proof for the current tip and seal a block that pays
    /// `reward_recipient` the mining reward.
    fn mine(&self, reward_recipient: &str) -> Result<Block>;
}

#[derive(Debug, Default)]
struct LedgerState {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    peers: PeerSet,
}

impl LedgerState {
    fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Index the next block will carry. Adopted chains are not index-checked,
    /// so the tip may sit at `u64::MAX`.
    fn next_index(&self) -> Result<u64> {
        let tip = self.last_block()?.index;
        tip.checked_add(1).ok_or(LedgerError::IndexOverflow(tip))
    }

    /// Moves the whole pool into a new block and appends it.
    fn create_block(&mut self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let previous_hash = match previous_hash.filter(|hash| !hash.is_empty()) {
            Some(hash) => hash.to_string(),
            None => self.last_block()?.hash(),
        };
        let len = self.chain.len() as u64;
        let index = len.checked_add(1).ok_or(LedgerError::IndexOverflow(len))?;
        let floor = self.chain.last().map_or(0, |block| block.timestamp);
        let block = Block {
            index,
            timestamp: unix_nanos().max(floor),
            transactions: std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        };
        self.chain.push(block.clone());
        Ok(block)
    }
}

/// In-memory ledger: chain, pending pool and peer set behind one lock.
///
/// Proof search and peer fetches run without the lock held.
#[derive(Debug)]
pub struct Ledger {
    state: RwLock<LedgerState>,
    parallel_mining: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// A ledger holding only the genesis block.
    pub fn new() -> Self {
        let genesis = genesis_block(unix_nanos());
        debug!(hash = %genesis.hash(), "genesis block created");
        let state = LedgerState {
            chain: vec![genesis],
            ..LedgerState::default()
        };
        Self {
            state: RwLock::new(state),
            parallel_mining: false,
        }
    }

    pub fn with_parallel_mining(mut self, enabled: bool) -> Self {
        self.parallel_mining = enabled;
        self
    }

    pub fn chain(&self) -> Vec<Block> {
        self.state.read().chain.clone()
    }

    pub fn len(&self) -> usize {
        self.state.read().chain.len()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.state.read().pending.clone()
    }

    pub fn peers(&self) -> Vec<String> {
        self.state.read().peers.to_vec()
    }
}

impl LedgerService for Ledger {
    fn register_node(&self, address: &str) -> bool {
        let mut state = self.state.write();
        match state.peers.insert(address) {
            Ok(added) => {
                if added {
                    info!(peer = address, total = state.peers.len(), "registered peer");
                }
                added
            }
            Err(err) => {
                warn!(error = %err, "peer registration rejected");
                false
            }
        }
    }

    fn valid_chain(&self, chain: &[Block]) -> bool {
        valid_chain(chain)
    }

    async fn resolve_conflicts<F: ChainFetcher>(&self, fetcher: &F) -> bool {
        let (peers, local_len) = {
            let state = self.state.read();
            (state.peers.to_vec(), state.chain.len())
        };

        let Some((address, chain)) = longest_valid_chain(fetcher, &peers, local_len).await else {
            debug!(local_len, "no longer valid chain among peers");
            return false;
        };

        let mut state = self.state.write();
        if chain.len() <= state.chain.len() {
            debug!(
                peer = %address,
                local_len = state.chain.len(),
                "local chain grew during resolution, keeping it"
            );
            return false;
        }
        info!(peer = %address, old_len = state.chain.len(), new_len = chain.len(), "replaced local chain");
        state.chain = chain;
        true
    }

    fn new_block(&self, proof: u64, previous_hash: Option<&str>) -> Result<Block> {
        let block = self.state.write().create_block(proof, previous_hash)?;
        info!(index = block.index, txs = block.transactions.len(), "new block");
        Ok(block)
    }

    fn new_transaction(&self, tx: Transaction) -> Result<u64> {
        let mut state = self.state.write();
        let next_index = state.next_index()?;
        state.pending.push(tx);
        Ok(next_index)
    }

    fn last_block(&self) -> Result<Block> {
        self.state.read().last_block().cloned()
    }

    fn proof_of_work(&self, last_proof: u64) -> u64 {
        if self.parallel_mining {
            proof_of_work_parallel(last_proof, PARALLEL_POW_WINDOW)
        } else {
            pow::proof_of_work(last_proof)
        }
    }

    fn verify_proof(&self, last_proof: u64, proof: u64) -> bool {
        pow::valid_proof(last_proof, proof)
    }

    fn mine(&self, reward_recipient: &str) -> Result<Block> {
        loop {
            let (last_proof, last_hash) = {
                let state = self.state.read();
                let last = state.last_block()?;
                (last.proof, last.hash())
            };

            let proof = self.proof_of_work(last_proof);

            let mut state = self.state.write();
            if state.last_block()?.hash() != last_hash {
                debug!("tip moved while mining, searching again");
                continue;
            }
            state.pending.push(Transaction::new(
                MINING_REWARD_SENDER,
                reward_recipient,
                MINING_REWARD,
            ));
            let block = state.create_block(proof, Some(&last_hash))?;
            info!(index = block.index, proof, txs = block.transactions.len(), "mined block");
            return Ok(block);
        }
    }
}
