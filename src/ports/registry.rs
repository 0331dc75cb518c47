//! Registry ports
//!
//! Storage-agnostic traits for the wallet and token registries.
//! Implementations must reject malformed addresses before writing.

use thiserror::Error;

use crate::domain::{Token, Wallet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Watched wallets keyed by address
pub trait WalletRegistry: Send + Sync {
    /// Insert a new wallet. Fails on malformed or already-registered addresses.
    fn add(&self, address: &str, name: Option<&str>) -> Result<(), RegistryError>;

    fn remove(&self, address: &str) -> Result<(), RegistryError>;

    fn rename(&self, address: &str, new_name: &str) -> Result<(), RegistryError>;

    /// All wallets in storage order
    fn list(&self) -> Result<Vec<Wallet>, RegistryError>;
}

/// Token mints and their tickers
pub trait TokenRegistry: Send + Sync {
    fn get(&self, address: &str) -> Result<Option<Token>, RegistryError>;

    /// Insert or overwrite the ticker for a mint
    fn upsert(&self, address: &str, ticker: &str) -> Result<(), RegistryError>;

    /// Insert only when the mint is not registered yet
    fn add_if_absent(&self, address: &str, ticker: &str) -> Result<(), RegistryError>;

    /// Delete a mint, returning the ticker it carried
    fn remove(&self, address: &str) -> Result<String, RegistryError>;

    fn list(&self) -> Result<Vec<Token>, RegistryError>;
}
