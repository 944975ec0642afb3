use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod consensus;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod peers;

pub use consensus::{ChainFetcher, RemoteChain};
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, LedgerService};
pub use peers::{parse_peer_address, PeerSet};

pub type Hash = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Canonical preimage of the block hash.
    ///
    /// Integers are fixed-width little-endian; strings and the transaction list
    /// are prefixed with their length as a u64. Field order is index, timestamp,
    /// transactions, proof, previous_hash. Any node hashing the same field values
    /// gets the same bytes.
    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 8 + 8 + self.transactions.len() * 40 + 8 + 8 + 64);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&(self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            put_str(&mut bytes, &tx.sender);
            put_str(&mut bytes, &tx.recipient);
            bytes.extend_from_slice(&tx.amount.to_le_bytes());
        }
        bytes.extend_from_slice(&self.proof.to_le_bytes());
        put_str(&mut bytes, &self.previous_hash);
        bytes
    }

    pub fn digest(&self) -> Hash {
        let digest = Sha256::digest(self.hash_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest[..]);
        out
    }

    /// Lowercase hex SHA-256 of [`Block::hash_bytes`]; this is what
    /// `previous_hash` links to.
    pub fn hash(&self) -> String {
        hex::encode(self.digest())
    }
}

fn put_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u64).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

/// Wall-clock nanoseconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

pub mod pow {
    use crate::constants::DIFFICULTY_PREFIX;
    use sha2::{Digest, Sha256};

    /// Hex SHA-256 of the decimal concatenation `"{last_proof}{proof}"`.
    pub fn proof_hash(last_proof: u64, proof: u64) -> String {
        let guess = format!("{last_proof}{proof}");
        hex::encode(Sha256::digest(guess.as_bytes()))
    }

    pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
        proof_hash(last_proof, proof).starts_with(DIFFICULTY_PREFIX)
    }

    /// Scan 0, 1, 2, ... and return the first proof accepted by [`valid_proof`].
    pub fn proof_of_work(last_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !valid_proof(last_proof, proof) {
            proof += 1;
        }
        proof
    }
}

pub mod chain {
    use super::*;
    use crate::constants::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
    use tracing::debug;

    /// The fixed first block: index 1, proof 100, previous hash "1", no transactions.
    pub fn genesis_block(timestamp: u64) -> Block {
        Block {
            index: 1,
            timestamp,
            transactions: vec![],
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        }
    }

    /// Check hash linkage and proof-of-work between every consecutive pair.
    /// The first block is trusted as-is, so empty and genesis-only chains pass.
    pub fn valid_chain(chain: &[Block]) -> bool {
        for pair in chain.windows(2) {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.previous_hash != prev.hash() {
                debug!(index = block.index, "previous_hash does not link to parent");
                return false;
            }
            if !pow::valid_proof(prev.proof, block.proof) {
                debug!(index = block.index, proof = block.proof, "proof-of-work rejected");
                return false;
            }
        }
        true
    }
}
