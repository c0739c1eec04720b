use serde::{Deserialize, Serialize};

/// Tunable parameters for a [`Ledger`](super::Ledger).
///
/// The defaults reproduce the original chain constants. The struct is
/// serde-deserializable so an embedding host can load it from a config
/// file; the crate itself never touches the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Required number of leading zero hex digits in a sealed block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,

    /// Amount credited to the miner of each sealed block.
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,

    /// Fixed timestamp (milliseconds since the Unix epoch) stamped on the
    /// genesis block.
    #[serde(default = "default_genesis_timestamp")]
    pub genesis_timestamp: i64,

    /// Sentinel `previous_hash` carried by the genesis block.
    #[serde(default = "default_genesis_previous_hash")]
    pub genesis_previous_hash: String,
}

fn default_difficulty() -> usize {
    2
}

fn default_mining_reward() -> u64 {
    100
}

// 2024-12-17T00:00:00Z
fn default_genesis_timestamp() -> i64 {
    1_734_393_600_000
}

fn default_genesis_previous_hash() -> String {
    "0".to_string()
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            genesis_timestamp: default_genesis_timestamp(),
            genesis_previous_hash: default_genesis_previous_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChainConfig::default();

        assert_eq!(config.difficulty, 2);
        assert_eq!(config.mining_reward, 100);
        assert_eq!(config.genesis_timestamp, 1_734_393_600_000);
        assert_eq!(config.genesis_previous_hash, "0");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ChainConfig = serde_json::from_str(r#"{"difficulty": 3}"#).unwrap();

        assert_eq!(config.difficulty, 3);
        assert_eq!(config.mining_reward, 100);
        assert_eq!(config.genesis_previous_hash, "0");
    }
}
