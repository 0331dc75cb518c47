use serde::{Deserialize, Serialize};

/// A watched wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Base58 owner address (registry key)
    pub address: String,
    /// Optional display name
    pub name: Option<String>,
}

impl Wallet {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name,
        }
    }

    /// Display name, or "N/A" when unnamed
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("N/A")
    }
}
