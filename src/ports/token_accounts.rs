//! Token account port
//!
//! The two RPC capabilities the balance fetcher needs. Addresses are
//! passed as base58 strings; adapters do their own decoding.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenAccountSource: Send + Sync {
    /// Token accounts owned by `owner` holding mint `mint`, in RPC order
    async fn list_token_accounts(&self, owner: &str, mint: &str) -> Result<Vec<String>, NetworkError>;

    /// Raw integer amount held by a token account
    async fn get_account_token_balance(&self, account: &str) -> Result<u64, NetworkError>;
}
