use serde::{Deserialize, Serialize};

/// A registered token mint with its ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Base58 mint address (registry key)
    pub address: String,
    /// Short symbol shown to users, e.g. "$WIF"
    pub ticker: String,
}

impl Token {
    pub fn new(address: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ticker: ticker.into(),
        }
    }
}
