use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid peer address `{0}`")]
    InvalidAddress(String),

    #[error("peer {address} unreachable: {reason}")]
    PeerUnreachable { address: String, reason: String },

    #[error("peer {address} sent an undecodable chain: {reason}")]
    PeerDecode { address: String, reason: String },

    #[error("peer {address} sent an invalid chain")]
    InvalidForeignChain { address: String },

    /// The chain has no blocks. Unreachable once genesis has been created.
    #[error("chain is empty")]
    EmptyChain,

    /// The tip's index leaves no room for a successor.
    #[error("block index overflow after {0}")]
    IndexOverflow(u64),
}
