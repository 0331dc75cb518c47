use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::parse_pubkey;
use crate::ports::{NetworkError, TokenAccountSource};

/// Public mainnet endpoint used when no RPC URL is configured
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Parse a commitment level name ("processed", "confirmed", "finalized")
pub fn parse_commitment(level: &str) -> Option<CommitmentConfig> {
    match level.to_ascii_lowercase().as_str() {
        "processed" => Some(CommitmentConfig::processed()),
        "confirmed" => Some(CommitmentConfig::confirmed()),
        "finalized" => Some(CommitmentConfig::finalized()),
        _ => None,
    }
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    /// Create a new Solana RPC client
    pub fn new(rpc_url: String, commitment: CommitmentConfig, timeout: Duration) -> Self {
        let client = Arc::new(RpcClient::new_with_timeout_and_commitment(rpc_url, timeout, commitment));
        Self { client }
    }

    /// RPC endpoint this client talks to
    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Token accounts owned by `owner` for a single mint
    pub async fn get_token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<String>, NetworkError> {
        let owner = parse_pubkey(owner).map_err(|e| NetworkError::InvalidPublicKey(e.to_string()))?;
        let mint = parse_pubkey(mint).map_err(|e| NetworkError::InvalidPublicKey(e.to_string()))?;

        // Spawn blocking to make sync RPC call async-compatible
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                .map(|accounts| accounts.into_iter().map(|keyed| keyed.pubkey).collect())
                .map_err(|e| NetworkError::Rpc(e.to_string()))
        })
        .await
        .map_err(|e| NetworkError::Rpc(format!("Task join error: {}", e)))?
    }

    /// Get SPL token account balance in raw base units
    pub async fn get_token_account_balance(
        &self,
        token_account_pubkey: &str,
    ) -> Result<u64, NetworkError> {
        let pubkey = parse_pubkey(token_account_pubkey)
            .map_err(|e| NetworkError::InvalidPublicKey(e.to_string()))?;

        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || {
            client
                .get_token_account_balance(&pubkey)
                .map_err(|e| NetworkError::Rpc(e.to_string()))
                .and_then(|balance| {
                    balance
                        .amount
                        .parse::<u64>()
                        .map_err(|e| NetworkError::Rpc(format!("Parse error: {}", e)))
                })
        })
        .await
        .map_err(|e| NetworkError::Rpc(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl TokenAccountSource for SolanaClient {
    async fn list_token_accounts(&self, owner: &str, mint: &str) -> Result<Vec<String>, NetworkError> {
        tracing::debug!("getTokenAccountsByOwner owner={} mint={}", owner, mint);
        self.get_token_accounts_by_owner(owner, mint).await
    }

    async fn get_account_token_balance(&self, account: &str) -> Result<u64, NetworkError> {
        tracing::debug!("getTokenAccountBalance account={}", account);
        self.get_token_account_balance(account).await
    }
}
