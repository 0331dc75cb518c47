use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;

use crate::domain::{is_valid_address, Token, Wallet};
use super::registry::{RegistryError, TokenRegistry, WalletRegistry};
use super::token_accounts::{NetworkError, TokenAccountSource};

/// In-memory wallet registry preserving insertion order
#[derive(Debug, Default, Clone)]
pub struct InMemoryWalletRegistry {
    wallets: Arc<Mutex<Vec<Wallet>>>,
}

impl InMemoryWalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to seed a wallet without validation
    pub fn with_wallet(self, address: &str, name: Option<&str>) -> Self {
        self.wallets
            .lock()
            .unwrap()
            .push(Wallet::new(address, name.map(str::to_string)));
        self
    }
}

impl WalletRegistry for InMemoryWalletRegistry {
    fn add(&self, address: &str, name: Option<&str>) -> Result<(), RegistryError> {
        if !is_valid_address(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }
        let mut wallets = self.wallets.lock().unwrap();
        if wallets.iter().any(|w| w.address == address) {
            return Err(RegistryError::AlreadyExists(address.to_string()));
        }
        wallets.push(Wallet::new(address, name.map(str::to_string)));
        Ok(())
    }

    fn remove(&self, address: &str) -> Result<(), RegistryError> {
        let mut wallets = self.wallets.lock().unwrap();
        let before = wallets.len();
        wallets.retain(|w| w.address != address);
        if wallets.len() == before {
            return Err(RegistryError::NotFound(address.to_string()));
        }
        Ok(())
    }

    fn rename(&self, address: &str, new_name: &str) -> Result<(), RegistryError> {
        let mut wallets = self.wallets.lock().unwrap();
        let wallet = wallets
            .iter_mut()
            .find(|w| w.address == address)
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))?;
        wallet.name = Some(new_name.to_string());
        Ok(())
    }

    fn list(&self) -> Result<Vec<Wallet>, RegistryError> {
        Ok(self.wallets.lock().unwrap().clone())
    }
}

/// In-memory token registry preserving insertion order
#[derive(Debug, Default, Clone)]
pub struct InMemoryTokenRegistry {
    tokens: Arc<Mutex<Vec<Token>>>,
}

impl InMemoryTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRegistry for InMemoryTokenRegistry {
    fn get(&self, address: &str) -> Result<Option<Token>, RegistryError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.address == address)
            .cloned())
    }

    fn upsert(&self, address: &str, ticker: &str) -> Result<(), RegistryError> {
        if !is_valid_address(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.address == address) {
            Some(token) => token.ticker = ticker.to_string(),
            None => tokens.push(Token::new(address, ticker)),
        }
        Ok(())
    }

    fn add_if_absent(&self, address: &str, ticker: &str) -> Result<(), RegistryError> {
        if self.get(address)?.is_some() {
            return Err(RegistryError::AlreadyExists(address.to_string()));
        }
        self.upsert(address, ticker)
    }

    fn remove(&self, address: &str) -> Result<String, RegistryError> {
        let mut tokens = self.tokens.lock().unwrap();
        let idx = tokens
            .iter()
            .position(|t| t.address == address)
            .ok_or_else(|| RegistryError::NotFound(address.to_string()))?;
        Ok(tokens.remove(idx).ticker)
    }

    fn list(&self) -> Result<Vec<Token>, RegistryError> {
        Ok(self.tokens.lock().unwrap().clone())
    }
}

/// Scripted outcome for one wallet owner
#[derive(Debug, Clone)]
enum OwnerScript {
    /// One token account per raw amount, in order
    Accounts(Vec<u64>),
    Fail(String),
    Hang,
}

/// Token account source that returns scripted balances per owner and
/// records every call. Owners with no script hold no accounts.
#[derive(Debug, Default, Clone)]
pub struct StubTokenAccounts {
    scripts: Arc<Mutex<HashMap<String, OwnerScript>>>,
    balances: Arc<Mutex<HashMap<String, u64>>>,
    calls: Arc<Mutex<Vec<String>>>,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter when an account listing ends or is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StubTokenAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: `owner` holds one account per entry of `raw_amounts`
    pub fn with_accounts(self, owner: &str, raw_amounts: &[u64]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(owner.to_string(), OwnerScript::Accounts(raw_amounts.to_vec()));
        self
    }

    /// Builder method: lookups for `owner` fail with an RPC error
    pub fn with_failure(self, owner: &str, message: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(owner.to_string(), OwnerScript::Fail(message.to_string()));
        self
    }

    /// Builder method: lookups for `owner` never complete
    pub fn with_hang(self, owner: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(owner.to_string(), OwnerScript::Hang);
        self
    }

    /// Builder method: every account listing sleeps this long first
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Most account listings that were running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Get all recorded calls, formatted as `method:arg`
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenAccountSource for StubTokenAccounts {
    async fn list_token_accounts(&self, owner: &str, mint: &str) -> Result<Vec<String>, NetworkError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list_token_accounts:{}", owner));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let script = self.scripts.lock().unwrap().get(owner).cloned();
        match script {
            None => Ok(Vec::new()),
            Some(OwnerScript::Fail(message)) => Err(NetworkError::Rpc(message)),
            Some(OwnerScript::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(NetworkError::Rpc("hang elapsed".to_string()))
            }
            Some(OwnerScript::Accounts(amounts)) => {
                let mut balances = self.balances.lock().unwrap();
                let accounts = amounts
                    .iter()
                    .enumerate()
                    .map(|(i, raw)| {
                        let account = format!("{}-{}-{}", owner, mint, i);
                        balances.insert(account.clone(), *raw);
                        account
                    })
                    .collect();
                Ok(accounts)
            }
        }
    }

    async fn get_account_token_balance(&self, account: &str) -> Result<u64, NetworkError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("get_account_token_balance:{}", account));

        self.balances
            .lock()
            .unwrap()
            .get(account)
            .copied()
            .ok_or_else(|| NetworkError::Rpc(format!("unknown account {}", account)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_token_accounts() {
        let stub = StubTokenAccounts::new()
            .with_accounts("owner", &[42])
            .with_failure("broken", "boom");

        let accounts = stub.list_token_accounts("owner", "mint").await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(stub.get_account_token_balance(&accounts[0]).await, Ok(42));

        assert!(stub.list_token_accounts("nobody", "mint").await.unwrap().is_empty());
        assert_eq!(
            stub.list_token_accounts("broken", "mint").await,
            Err(NetworkError::Rpc("boom".to_string()))
        );
        assert_eq!(stub.get_calls().len(), 4);
        assert_eq!(stub.peak_in_flight(), 1);
    }

    #[test]
    fn test_in_memory_wallets() {
        let registry = InMemoryWalletRegistry::new();
        let address = "96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5";

        registry.add(address, None).unwrap();
        assert_eq!(
            registry.add(address, None),
            Err(RegistryError::AlreadyExists(address.to_string()))
        );
        registry.rename(address, "tips").unwrap();
        assert_eq!(registry.list().unwrap()[0].name.as_deref(), Some("tips"));
        registry.remove(address).unwrap();
        assert!(registry.list().unwrap().is_empty());
    }
}
