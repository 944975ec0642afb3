pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const DIFFICULTY_PREFIX: &str = "0000";
pub const MINING_REWARD: i64 = 1;
/// Sender recorded on the reward transaction; signals that the node minted it.
pub const MINING_REWARD_SENDER: &str = "0";
pub const PARALLEL_POW_WINDOW: u64 = 1 << 14;
