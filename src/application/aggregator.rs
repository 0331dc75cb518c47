//! Balance Aggregator
//!
//! Fans the balance fetcher out over every registered wallet and folds
//! the results into a `BalanceReport`. A failing or slow wallet is logged
//! and skipped; it never aborts the rest of the check.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{BalanceReport, Wallet};
use crate::ports::{NetworkError, RegistryError, WalletRegistry};
use super::fetcher::BalanceFetcher;

/// Concurrent RPC lookups allowed by default
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Per-wallet fetch deadline used by default
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Aggregates one token's balance across the wallet registry
#[derive(Clone)]
pub struct BalanceAggregator {
    wallets: Arc<dyn WalletRegistry>,
    fetcher: BalanceFetcher,
    max_concurrent: usize,
    fetch_timeout: Duration,
}

impl BalanceAggregator {
    pub fn new(wallets: Arc<dyn WalletRegistry>, fetcher: BalanceFetcher) -> Self {
        Self {
            wallets,
            fetcher,
            max_concurrent: DEFAULT_MAX_CONCURRENT_FETCHES,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Cap the number of in-flight fetches (minimum 1)
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Check `mint` across all registered wallets.
    ///
    /// Only a registry read failure is returned as an error. Network
    /// failures are per wallet and only reduce the holdings found.
    pub async fn aggregate(&self, mint: &str) -> Result<BalanceReport, RegistryError> {
        let wallets = self.wallets.list()?;
        let mut report = BalanceReport::new(wallets.len());

        tracing::info!(
            "Checking {} across {} wallets (concurrency {})",
            mint,
            wallets.len(),
            self.max_concurrent
        );

        let outcomes: Vec<_> = stream::iter(wallets)
            .map(|wallet| self.fetch_one(wallet, mint))
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut failures = 0usize;
        for (wallet, outcome) in outcomes {
            match outcome {
                Ok(amount) => {
                    if report.record(wallet.address.clone(), wallet.name, amount) {
                        tracing::debug!("Wallet {} holds {} of {}", wallet.address, amount, mint);
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!("Error processing wallet {}: {}", wallet.address, e);
                }
            }
        }

        tracing::info!(
            "Token {} held by {}/{} wallets ({} lookups failed)",
            mint,
            report.wallets_with_balance,
            report.total_wallets,
            failures
        );

        Ok(report)
    }

    async fn fetch_one(
        &self,
        wallet: Wallet,
        mint: &str,
    ) -> (Wallet, Result<rust_decimal::Decimal, NetworkError>) {
        let outcome = match tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&wallet.address, mint),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout(self.fetch_timeout)),
        };
        (wallet, outcome)
    }
}
