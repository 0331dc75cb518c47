//! Shared fixtures for integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watchlist_bot::ports::{NetworkError, TokenAccountSource};

/// Token account source with scripted per-owner balances that records
/// every lookup. Owners with no script hold no accounts.
#[derive(Debug, Default, Clone)]
pub struct ScriptedAccounts {
    holdings: Arc<Mutex<HashMap<String, Result<Vec<u64>, String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// `owner` holds one account per entry of `raw_amounts`
    pub fn with_accounts(self, owner: &str, raw_amounts: &[u64]) -> Self {
        self.holdings
            .lock()
            .unwrap()
            .insert(owner.to_string(), Ok(raw_amounts.to_vec()));
        self
    }

    /// Lookups for `owner` fail with an RPC error
    pub fn with_failure(self, owner: &str, message: &str) -> Self {
        self.holdings
            .lock()
            .unwrap()
            .insert(owner.to_string(), Err(message.to_string()));
        self
    }

    /// Owners whose accounts were listed, in call order
    pub fn listed_owners(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenAccountSource for ScriptedAccounts {
    async fn list_token_accounts(&self, owner: &str, _mint: &str) -> Result<Vec<String>, NetworkError> {
        self.calls.lock().unwrap().push(owner.to_string());

        match self.holdings.lock().unwrap().get(owner) {
            None => Ok(Vec::new()),
            Some(Err(message)) => Err(NetworkError::Rpc(message.clone())),
            Some(Ok(amounts)) => Ok((0..amounts.len())
                .map(|i| format!("{}/{}", owner, i))
                .collect()),
        }
    }

    async fn get_account_token_balance(&self, account: &str) -> Result<u64, NetworkError> {
        let (owner, index) = account
            .rsplit_once('/')
            .ok_or_else(|| NetworkError::InvalidPublicKey(account.to_string()))?;
        let index: usize = index
            .parse()
            .map_err(|_| NetworkError::InvalidPublicKey(account.to_string()))?;

        match self.holdings.lock().unwrap().get(owner) {
            Some(Ok(amounts)) => amounts
                .get(index)
                .copied()
                .ok_or_else(|| NetworkError::Rpc(format!("unknown account {}", account))),
            _ => Err(NetworkError::Rpc(format!("unknown account {}", account))),
        }
    }
}
